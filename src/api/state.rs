//! Shared application state handed to every route.

use std::sync::Arc;

use chrono::Duration;

use crate::auth::{IdentityService, PasswordHasher, TokenIssuer};
use crate::config::Config;
use crate::handlers::{PurchaseHandler, TransferHandler};
use crate::projection::ProjectionService;
use crate::store::ShopStore;

#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,
    pub transfers: TransferHandler,
    pub purchases: PurchaseHandler,
    pub projection: ProjectionService,
}

impl AppState {
    /// Wire every service onto one store.
    pub fn new(store: Arc<dyn ShopStore>, identity: IdentityService) -> Self {
        Self {
            identity,
            transfers: TransferHandler::new(store.clone()),
            purchases: PurchaseHandler::new(store.clone()),
            projection: ProjectionService::new(store),
        }
    }

    /// Build state with the production hasher and the configured token settings.
    pub fn from_config(store: Arc<dyn ShopStore>, config: &Config) -> Self {
        let tokens = TokenIssuer::new(&config.jwt_secret, Duration::hours(config.token_ttl_hours));
        let identity = IdentityService::new(store.clone(), PasswordHasher::new(), tokens);
        Self::new(store, identity)
    }
}
