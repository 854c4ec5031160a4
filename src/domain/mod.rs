//! Domain module
//!
//! Core domain types and business rules.

pub mod amount;
pub mod catalog;
pub mod context;
pub mod error;
pub mod records;

pub use amount::{Amount, AmountError, Balance};
pub use catalog::CatalogItem;
pub use context::OperationContext;
pub use error::DomainError;
pub use records::{
    Account, Counterparty, LedgerEntry, NewLedgerEntry, Purchase, INITIAL_BALANCE, STORE_LABEL,
    UNKNOWN_LABEL,
};
