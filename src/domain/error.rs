//! Domain Error Types
//!
//! Errors raised by the ledger core. Storage failures are carried through
//! untouched so the web layer can report them as internal errors.

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Ledger-level errors
///
/// Everything except `Storage` is a business-rule or validation failure and
/// is guaranteed to have left the store untouched.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Zero or negative coin amount
    #[error("amount must be positive")]
    InvalidAmount,

    /// Empty recipient name, or a transfer to oneself
    #[error("{0}")]
    InvalidRecipient(String),

    /// The acting account does not exist; its credential outlived it
    #[error("user not found: {0}")]
    AccountNotFound(Uuid),

    /// No account carries the requested recipient name
    #[error("recipient not found: {0}")]
    RecipientNotFound(String),

    /// Balance does not cover the requested debit
    #[error("not enough coins: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// Item is not in the catalog
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// Persistence failure; the unit of work was rolled back
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: i64, available: i64) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Check if this is a client error (caller's fault, nothing mutated)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::AccountNotFound(_))
    }
}
