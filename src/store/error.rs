//! Store Errors
//!
//! Error types for account and ledger persistence.

/// Errors that can occur in a store adapter
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Username already belongs to another account
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// A stored row violates a domain invariant
    #[error("store invariant violated: {0}")]
    InvariantViolation(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Check if this error is a unique-username conflict
    pub fn is_username_taken(&self) -> bool {
        matches!(self, StoreError::UsernameTaken(_))
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
