//! Postgres store
//!
//! sqlx-backed [`ShopStore`]. A unit of work is one database transaction;
//! accounts are locked with `SELECT ... FOR UPDATE` so the funds check and
//! the balance writes see the same row versions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Account, Amount, Balance, LedgerEntry, NewLedgerEntry, Purchase};

use super::{ShopStore, StoreError, StoreResult, UnitOfWork};

type AccountRow = (Uuid, String, String, i64, DateTime<Utc>);
type LedgerRow = (i64, Option<Uuid>, Option<Uuid>, i64, DateTime<Utc>);
type PurchaseRow = (i64, Uuid, String, i32, DateTime<Utc>);

fn account_from_row(row: AccountRow) -> StoreResult<Account> {
    let (id, username, password_hash, balance, created_at) = row;
    let balance = Balance::new(balance).map_err(|e| {
        StoreError::InvariantViolation(format!("account {} balance: {}", id, e))
    })?;
    Ok(Account {
        id,
        username,
        password_hash,
        balance,
        created_at,
    })
}

fn ledger_entry_from_row(row: LedgerRow) -> StoreResult<LedgerEntry> {
    let (id, from_account_id, to_account_id, amount, created_at) = row;
    if from_account_id.is_none() && to_account_id.is_none() {
        return Err(StoreError::InvariantViolation(format!(
            "ledger entry {} has neither source nor destination",
            id
        )));
    }
    let amount = Amount::new(amount).map_err(|e| {
        StoreError::InvariantViolation(format!("ledger entry {} amount: {}", id, e))
    })?;
    Ok(LedgerEntry {
        id,
        from_account_id,
        to_account_id,
        amount,
        created_at,
    })
}

fn purchase_from_row(row: PurchaseRow) -> Purchase {
    let (id, account_id, item_name, quantity, created_at) = row;
    Purchase {
        id,
        account_id,
        item_name,
        quantity,
        created_at,
    }
}

/// Postgres-backed store
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgresStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShopStore for PostgresStore {
    async fn find_account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, balance, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(account_from_row).transpose()
    }

    async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, balance, created_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(account_from_row).transpose()
    }

    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        initial_balance: Balance,
    ) -> StoreResult<Account> {
        let id = Uuid::new_v4();
        let created_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (id, username, password_hash, balance)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO NOTHING
            RETURNING created_at
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(initial_balance.value())
        .fetch_optional(&self.pool)
        .await?;

        let created_at = created_at.ok_or_else(|| StoreError::UsernameTaken(username.to_string()))?;

        Ok(Account {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            balance: initial_balance,
            created_at,
        })
    }

    async fn ledger_entries_for(&self, account_id: Uuid) -> StoreResult<Vec<LedgerEntry>> {
        let rows: Vec<LedgerRow> = sqlx::query_as(
            r#"
            SELECT id, from_account_id, to_account_id, amount, created_at
            FROM ledger_entries
            WHERE from_account_id = $1 OR to_account_id = $1
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ledger_entry_from_row).collect()
    }

    async fn purchases_for(&self, account_id: Uuid) -> StoreResult<Vec<Purchase>> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, item_name, quantity, created_at
            FROM purchases
            WHERE account_id = $1
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(purchase_from_row).collect())
    }

    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// One open Postgres transaction; rolled back by sqlx on drop
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_accounts(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Account>> {
        let mut sorted: Vec<Uuid> = ids.to_vec();
        sorted.sort();
        sorted.dedup();

        let rows: Vec<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, balance, created_at
            FROM accounts
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(sorted)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(account_from_row).collect()
    }

    async fn set_balance(&mut self, account_id: Uuid, balance: Balance) -> StoreResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = $2
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(balance.value())
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::InvariantViolation(format!(
                "account {} does not exist",
                account_id
            )));
        }
        Ok(())
    }

    async fn append_ledger_entry(&mut self, entry: NewLedgerEntry) -> StoreResult<LedgerEntry> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO ledger_entries (from_account_id, to_account_id, amount)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(entry.from_account_id())
        .bind(entry.to_account_id())
        .bind(entry.amount().value())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(LedgerEntry {
            id,
            from_account_id: entry.from_account_id(),
            to_account_id: entry.to_account_id(),
            amount: entry.amount(),
            created_at,
        })
    }

    async fn append_purchase(
        &mut self,
        account_id: Uuid,
        item_name: &str,
        quantity: i32,
    ) -> StoreResult<Purchase> {
        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO purchases (account_id, item_name, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(account_id)
        .bind(item_name)
        .bind(quantity)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(Purchase {
            id,
            account_id,
            item_name: item_name.to_string(),
            quantity,
            created_at,
        })
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
