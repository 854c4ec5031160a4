//! Projection module
//!
//! Read models derived from the ledger and purchase log.

mod service;

pub use service::{
    aggregate_inventory, build_history, AccountInfo, CoinHistory, InventoryItem,
    ProjectionService, ReceivedCoins, SentCoins,
};
