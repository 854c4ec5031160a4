//! Persistent records
//!
//! Accounts, ledger entries and purchases as the stores hand them out.
//! Ledger entries and purchases are append-only; an account's balance is a
//! cached aggregate of its ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, Balance};

/// Coins granted to every freshly provisioned account
pub const INITIAL_BALANCE: i64 = 1000;

/// Label used for the implicit shop counterparty
pub const STORE_LABEL: &str = "store";

/// Label used when a counterparty account cannot be resolved
pub const UNKNOWN_LABEL: &str = "unknown";

/// A user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub balance: Balance,
    pub created_at: DateTime<Utc>,
}

/// One immutable coin movement.
///
/// `from_account_id == None` means coins came from the store,
/// `to_account_id == None` means they went to the store (a purchase).
/// Both absent never happens; see [`NewLedgerEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub from_account_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

/// The other side of a ledger entry, seen from one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counterparty {
    Account(Uuid),
    Store,
}

impl From<Option<Uuid>> for Counterparty {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(Counterparty::Store, Counterparty::Account)
    }
}

impl LedgerEntry {
    /// Source of the coins
    pub fn source(&self) -> Counterparty {
        self.from_account_id.into()
    }

    /// Destination of the coins
    pub fn destination(&self) -> Counterparty {
        self.to_account_id.into()
    }

    /// Signed effect of this entry on the given account's balance.
    pub fn effect_on(&self, account_id: Uuid) -> i64 {
        let mut effect = 0;
        if self.to_account_id == Some(account_id) {
            effect += self.amount.value();
        }
        if self.from_account_id == Some(account_id) {
            effect -= self.amount.value();
        }
        effect
    }
}

/// A ledger entry waiting to be appended.
///
/// Only constructible through [`NewLedgerEntry::transfer`] and
/// [`NewLedgerEntry::purchase`], so at least one side is always an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLedgerEntry {
    from_account_id: Option<Uuid>,
    to_account_id: Option<Uuid>,
    amount: Amount,
}

impl NewLedgerEntry {
    /// Coins moving between two accounts
    pub fn transfer(from: Uuid, to: Uuid, amount: Amount) -> Self {
        Self {
            from_account_id: Some(from),
            to_account_id: Some(to),
            amount,
        }
    }

    /// Coins spent at the store
    pub fn purchase(from: Uuid, amount: Amount) -> Self {
        Self {
            from_account_id: Some(from),
            to_account_id: None,
            amount,
        }
    }

    pub fn from_account_id(&self) -> Option<Uuid> {
        self.from_account_id
    }

    pub fn to_account_id(&self) -> Option<Uuid> {
        self.to_account_id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// One purchased item (always quantity 1 when written by the ledger core)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub account_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}
