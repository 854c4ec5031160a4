//! Identity Service
//!
//! Log in or sign up with a single call: an unknown username is provisioned
//! with the starting balance, a known one must present the right password.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Account, Balance, INITIAL_BALANCE};
use crate::store::{ShopStore, StoreError};

use super::{AuthError, PasswordHasher, TokenIssuer};

/// Authenticates users and resolves bearer tokens
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn ShopStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl IdentityService {
    pub fn new(store: Arc<dyn ShopStore>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Authenticate (provisioning on first sight) and issue a bearer token.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let account = match self.store.find_account_by_username(username).await? {
            Some(account) => self.check_password(account, password).await?,
            None => self.provision(username, password).await?,
        };

        self.tokens.issue(account.id)
    }

    /// Resolve a bearer token to an account id.
    pub fn resolve(&self, token: &str) -> Result<Uuid, AuthError> {
        self.tokens.verify(token)
    }

    async fn provision(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let hash = self.hash_blocking(password).await?;
        let initial = Balance::new(INITIAL_BALANCE)
            .map_err(|e| AuthError::Storage(StoreError::InvariantViolation(e.to_string())))?;

        match self.store.create_account(username, &hash, initial).await {
            Ok(account) => {
                tracing::info!(account = %account.id, username, "Account provisioned");
                Ok(account)
            }
            // Someone else provisioned the same name in the meantime; treat as login.
            Err(e) if e.is_username_taken() => {
                let existing = self
                    .store
                    .find_account_by_username(username)
                    .await?
                    .ok_or(AuthError::Storage(e))?;
                self.check_password(existing, password).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn check_password(&self, account: Account, password: &str) -> Result<Account, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let stored = account.password_hash.clone();

        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;

        if matches {
            Ok(account)
        } else {
            tracing::warn!(account = %account.id, "Password mismatch");
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }
}
