//! In-memory store
//!
//! Process-local [`ShopStore`] used for development and tests. A unit of work
//! holds the single state mutex from `begin` until it is committed or
//! dropped, so units of work are fully serialized.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::{Account, Balance, LedgerEntry, NewLedgerEntry, Purchase};

use super::{ShopStore, StoreError, StoreResult, UnitOfWork};

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<Uuid, Account>,
    ledger: Vec<LedgerEntry>,
    purchases: Vec<Purchase>,
    next_entry_id: i64,
    next_purchase_id: i64,
}

/// Shared in-memory store; clones share the same state
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShopStore for InMemoryStore {
    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.state.lock().await.accounts.get(&id).cloned())
    }

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|account| account.username == username)
            .cloned())
    }

    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        initial_balance: Balance,
    ) -> StoreResult<Account> {
        let mut state = self.state.lock().await;
        if state.accounts.values().any(|a| a.username == username) {
            return Err(StoreError::UsernameTaken(username.to_string()));
        }

        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            balance: initial_balance,
            created_at: Utc::now(),
        };
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn ledger_entries_for(&self, account_id: Uuid) -> StoreResult<Vec<LedgerEntry>> {
        let state = self.state.lock().await;
        let mut entries: Vec<LedgerEntry> = state
            .ledger
            .iter()
            .filter(|e| {
                e.from_account_id == Some(account_id) || e.to_account_id == Some(account_id)
            })
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(entries)
    }

    async fn purchases_for(&self, account_id: Uuid) -> StoreResult<Vec<Purchase>> {
        let state = self.state.lock().await;
        let mut purchases: Vec<Purchase> = state
            .purchases
            .iter()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect();
        purchases.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(purchases)
    }

    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let state = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            state,
            locked: HashSet::new(),
            balances: HashMap::new(),
            ledger: Vec::new(),
            purchases: Vec::new(),
        }))
    }
}

/// Staged writes on top of the exclusively held state
struct MemoryUnitOfWork {
    state: OwnedMutexGuard<MemoryState>,
    locked: HashSet<Uuid>,
    balances: HashMap<Uuid, Balance>,
    ledger: Vec<LedgerEntry>,
    purchases: Vec<Purchase>,
}

impl MemoryUnitOfWork {
    fn ensure_account(&self, id: Uuid) -> StoreResult<()> {
        if self.state.accounts.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::InvariantViolation(format!(
                "account {} does not exist",
                id
            )))
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_accounts(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Account>> {
        let mut sorted: Vec<Uuid> = ids.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut accounts = Vec::with_capacity(sorted.len());
        for id in sorted {
            if let Some(account) = self.state.accounts.get(&id) {
                let mut account = account.clone();
                if let Some(balance) = self.balances.get(&id) {
                    account.balance = *balance;
                }
                self.locked.insert(id);
                accounts.push(account);
            }
        }
        Ok(accounts)
    }

    async fn set_balance(&mut self, account_id: Uuid, balance: Balance) -> StoreResult<()> {
        if !self.locked.contains(&account_id) {
            return Err(StoreError::InvariantViolation(format!(
                "balance write on unlocked account {}",
                account_id
            )));
        }
        self.balances.insert(account_id, balance);
        Ok(())
    }

    async fn append_ledger_entry(&mut self, entry: NewLedgerEntry) -> StoreResult<LedgerEntry> {
        for id in [entry.from_account_id(), entry.to_account_id()]
            .into_iter()
            .flatten()
        {
            self.ensure_account(id)?;
        }

        // Ids are handed out eagerly, so a rollback leaves a gap like a sequence would.
        self.state.next_entry_id += 1;
        let stored = LedgerEntry {
            id: self.state.next_entry_id,
            from_account_id: entry.from_account_id(),
            to_account_id: entry.to_account_id(),
            amount: entry.amount(),
            created_at: Utc::now(),
        };
        self.ledger.push(stored.clone());
        Ok(stored)
    }

    async fn append_purchase(
        &mut self,
        account_id: Uuid,
        item_name: &str,
        quantity: i32,
    ) -> StoreResult<Purchase> {
        self.ensure_account(account_id)?;
        if quantity <= 0 {
            return Err(StoreError::InvariantViolation(format!(
                "purchase quantity must be positive (got {})",
                quantity
            )));
        }

        self.state.next_purchase_id += 1;
        let purchase = Purchase {
            id: self.state.next_purchase_id,
            account_id,
            item_name: item_name.to_string(),
            quantity,
            created_at: Utc::now(),
        };
        self.purchases.push(purchase.clone());
        Ok(purchase)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryUnitOfWork {
            mut state,
            balances,
            ledger,
            purchases,
            ..
        } = *self;

        for (id, balance) in balances {
            if let Some(account) = state.accounts.get_mut(&id) {
                account.balance = balance;
            }
        }
        state.ledger.extend(ledger);
        state.purchases.extend(purchases);
        Ok(())
    }
}
