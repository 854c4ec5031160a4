//! Common test utilities
#![allow(dead_code)]

use std::sync::Arc;

use argon2::Params;
use axum::Router;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use merch_shop::api::{self, AppState};
use merch_shop::auth::{IdentityService, PasswordHasher, TokenIssuer};
use merch_shop::domain::{Balance, INITIAL_BALANCE};
use merch_shop::handlers::{PurchaseHandler, TransferHandler};
use merch_shop::projection::ProjectionService;
use merch_shop::store::ShopStore;

pub const TEST_SECRET: &str = "test-secret";

/// Argon2 with minimal cost so tests don't spend seconds hashing
pub fn cheap_hasher() -> PasswordHasher {
    PasswordHasher::with_params(Params::new(1024, 1, 1, None).unwrap())
}

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(TEST_SECRET, Duration::hours(1))
}

pub fn identity(store: Arc<dyn ShopStore>) -> IdentityService {
    IdentityService::new(store, cheap_hasher(), token_issuer())
}

/// Full router over the given store
pub fn app(store: Arc<dyn ShopStore>) -> Router {
    api::create_router(AppState::new(store.clone(), identity(store)))
}

/// Ledger services over one store
pub struct Ledger {
    pub store: Arc<dyn ShopStore>,
    pub transfers: TransferHandler,
    pub purchases: PurchaseHandler,
    pub projection: ProjectionService,
}

impl Ledger {
    pub fn new(store: Arc<dyn ShopStore>) -> Self {
        Self {
            transfers: TransferHandler::new(store.clone()),
            purchases: PurchaseHandler::new(store.clone()),
            projection: ProjectionService::new(store.clone()),
            store,
        }
    }

    pub async fn balance(&self, account_id: Uuid) -> i64 {
        self.store
            .find_account(account_id)
            .await
            .unwrap()
            .unwrap()
            .balance
            .value()
    }

    /// Initial stake plus the signed sum of every ledger entry
    pub async fn replayed_balance(&self, account_id: Uuid) -> i64 {
        INITIAL_BALANCE
            + self
                .store
                .ledger_entries_for(account_id)
                .await
                .unwrap()
                .iter()
                .map(|e| e.effect_on(account_id))
                .sum::<i64>()
    }
}

/// Create an account with the starting balance
pub async fn provision(store: &Arc<dyn ShopStore>, username: &str) -> Uuid {
    store
        .create_account(username, "not-a-real-hash", Balance::new(INITIAL_BALANCE).unwrap())
        .await
        .unwrap()
        .id
}

/// Username unique across test runs sharing one database
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

/// Connect to the test database, or `None` when DATABASE_URL is unset
pub async fn postgres_pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    merch_shop::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}
