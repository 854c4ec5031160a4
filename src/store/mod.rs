//! Store module
//!
//! Persistence seam for accounts, the ledger and purchases.
//!
//! Reads that don't need isolation go straight through [`ShopStore`].
//! Balance mutations happen inside a [`UnitOfWork`]: rows locked through it
//! stay locked until `commit`, and dropping it without committing rolls every
//! staged write back.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, Balance, LedgerEntry, NewLedgerEntry, Purchase};

mod error;
mod memory;
mod postgres;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Account, ledger and purchase persistence
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Fetch an account by identity.
    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>>;

    /// Fetch an account by its unique username.
    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>>;

    /// Insert a new account.
    ///
    /// Fails with [`StoreError::UsernameTaken`] if the username exists.
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        initial_balance: Balance,
    ) -> StoreResult<Account>;

    /// Every ledger entry where the account is source or destination,
    /// most recent first, ties broken by ascending entry id.
    async fn ledger_entries_for(&self, account_id: Uuid) -> StoreResult<Vec<LedgerEntry>>;

    /// Every purchase made by the account, most recent first.
    async fn purchases_for(&self, account_id: Uuid) -> StoreResult<Vec<Purchase>>;

    /// Open an atomic unit of work.
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;
}

/// An open transaction against a [`ShopStore`]
#[async_trait]
pub trait UnitOfWork: Send {
    /// Lock and return the given accounts, in ascending id order.
    ///
    /// Missing ids are simply absent from the result. Locking in id order
    /// keeps two units of work touching the same pair of accounts from
    /// deadlocking each other.
    async fn lock_accounts(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Account>>;

    /// Overwrite the cached balance of a locked account.
    async fn set_balance(&mut self, account_id: Uuid, balance: Balance) -> StoreResult<()>;

    /// Append a ledger entry.
    async fn append_ledger_entry(&mut self, entry: NewLedgerEntry) -> StoreResult<LedgerEntry>;

    /// Append a purchase record.
    async fn append_purchase(
        &mut self,
        account_id: Uuid,
        item_name: &str,
        quantity: i32,
    ) -> StoreResult<Purchase>;

    /// Make every staged write visible atomically.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
