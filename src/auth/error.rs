//! Authentication errors

use crate::store::StoreError;

/// Errors raised while authenticating users or resolving credentials
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Empty username/password, or a password mismatch
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer credential missing, malformed or expired
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Password hashing backend failure
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Token signing failure
    #[error("token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AuthError {
    /// Whether the caller should see 401 rather than 500
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::Unauthenticated(_))
    }
}
