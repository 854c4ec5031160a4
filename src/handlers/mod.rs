//! Command Handlers module
//!
//! The balance-mutating side of the ledger. Each handler validates its
//! command, then applies every write inside a single store unit of work.

mod commands;
mod purchase_handler;
mod transfer_handler;

pub use commands::*;
pub use purchase_handler::PurchaseHandler;
pub use transfer_handler::TransferHandler;
