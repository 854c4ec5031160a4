//! Command definitions
//!
//! Commands represent intentions to change balances.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to send coins to another account by username
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    /// Authenticated sender
    pub from_account_id: Uuid,
    /// Recipient username (trimmed before lookup)
    pub to_username: String,
    /// Coins to move; validated by the handler
    pub amount: i64,
}

impl TransferCommand {
    pub fn new(from_account_id: Uuid, to_username: impl Into<String>, amount: i64) -> Self {
        Self {
            from_account_id,
            to_username: to_username.into(),
            amount,
        }
    }
}

// =========================================================================
// PurchaseCommand
// =========================================================================

/// Command to buy one unit of a catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseCommand {
    pub account_id: Uuid,
    /// Catalog item name (trimmed before lookup)
    pub item_name: String,
}

impl PurchaseCommand {
    pub fn new(account_id: Uuid, item_name: impl Into<String>) -> Self {
        Self {
            account_id,
            item_name: item_name.into(),
        }
    }
}

/// Result of a successful transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub entry_id: i64,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: i64,
    /// Sender balance after the debit
    pub sender_balance: i64,
}

/// Result of a successful purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseResult {
    pub entry_id: i64,
    pub purchase_id: i64,
    pub account_id: Uuid,
    pub item_name: String,
    pub price: i64,
    /// Buyer balance after the debit
    pub balance: i64,
}
