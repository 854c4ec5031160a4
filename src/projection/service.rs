//! Projection Service
//!
//! Read side of the ledger: current balance, inventory aggregated from
//! purchase records and coin history derived from ledger entries.
//! Nothing here writes; inventory and history are never stored as totals.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    Counterparty, DomainError, LedgerEntry, Purchase, STORE_LABEL, UNKNOWN_LABEL,
};
use crate::store::ShopStore;

/// Quantity of one item owned by an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: i64,
}

/// Coins received from a counterparty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedCoins {
    pub from_user: String,
    pub amount: i64,
}

/// Coins sent to a counterparty or spent at the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentCoins {
    pub to_user: String,
    pub amount: i64,
}

/// Received and sent movements, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoinHistory {
    pub received: Vec<ReceivedCoins>,
    pub sent: Vec<SentCoins>,
}

/// Everything `/api/info` reports about an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub coins: i64,
    pub inventory: Vec<InventoryItem>,
    pub coin_history: CoinHistory,
}

/// Projection Service for account queries
#[derive(Clone)]
pub struct ProjectionService {
    store: Arc<dyn ShopStore>,
}

impl ProjectionService {
    /// Create a new ProjectionService
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self { store }
    }

    /// Balance, inventory and history for one account
    pub async fn account_info(&self, account_id: Uuid) -> Result<AccountInfo, DomainError> {
        let account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or(DomainError::AccountNotFound(account_id))?;

        let purchases = self.store.purchases_for(account_id).await?;
        let entries = self.store.ledger_entries_for(account_id).await?;

        let names = self.counterparty_names(account_id, &entries).await;
        let coin_history = build_history(account_id, &entries, &names);

        Ok(AccountInfo {
            coins: account.balance.value(),
            inventory: aggregate_inventory(&purchases),
            coin_history,
        })
    }

    /// Resolve counterparty usernames, skipping any that fail to load.
    async fn counterparty_names(
        &self,
        account_id: Uuid,
        entries: &[LedgerEntry],
    ) -> HashMap<Uuid, String> {
        let counterparties: BTreeSet<Uuid> = entries
            .iter()
            .flat_map(|e| [e.from_account_id, e.to_account_id])
            .flatten()
            .filter(|id| *id != account_id)
            .collect();

        let mut names = HashMap::new();
        for id in counterparties {
            match self.store.find_account(id).await {
                Ok(Some(account)) => {
                    names.insert(id, account.username);
                }
                Ok(None) => {
                    tracing::warn!(counterparty = %id, "Ledger counterparty not found");
                }
                Err(e) => {
                    tracing::warn!(counterparty = %id, error = %e, "Ledger counterparty lookup failed");
                }
            }
        }
        names
    }
}

/// Sum purchase quantities per item name, ordered by name.
pub fn aggregate_inventory(purchases: &[Purchase]) -> Vec<InventoryItem> {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for purchase in purchases {
        *totals.entry(purchase.item_name.as_str()).or_default() += i64::from(purchase.quantity);
    }
    totals
        .into_iter()
        .map(|(item, quantity)| InventoryItem {
            item_type: item.to_string(),
            quantity,
        })
        .collect()
}

/// Split ledger entries into received and sent history, preserving order.
pub fn build_history(
    account_id: Uuid,
    entries: &[LedgerEntry],
    names: &HashMap<Uuid, String>,
) -> CoinHistory {
    let label = |counterparty: Counterparty| match counterparty {
        Counterparty::Store => STORE_LABEL.to_string(),
        Counterparty::Account(id) => names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
    };

    let mut history = CoinHistory::default();
    for entry in entries {
        if entry.to_account_id == Some(account_id) {
            history.received.push(ReceivedCoins {
                from_user: label(entry.source()),
                amount: entry.amount.value(),
            });
        } else if entry.from_account_id == Some(account_id) {
            history.sent.push(SentCoins {
                to_user: label(entry.destination()),
                amount: entry.amount.value(),
            });
        }
    }
    history
}
