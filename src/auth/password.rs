//! Password hashing
//!
//! Argon2id PHC strings; the salt and parameters travel inside the hash.

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, Params, PasswordHasher as _, PasswordVerifier as _};
use rand::rngs::OsRng;

use super::AuthError;

/// Hashes and verifies account passwords
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Argon2id with the crate's default (interactive login) parameters
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Argon2id with custom cost parameters
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Check a password against a stored PHC string.
    ///
    /// A stored hash that cannot be parsed is an internal error, not a mismatch.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hashing(e.to_string())),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
