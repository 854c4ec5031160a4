//! Bearer tokens
//!
//! HS256 JWTs carrying the account id in a `user_id` claim plus `exp`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub exp: i64,
}

/// Signs and validates bearer tokens with a process-wide secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issue a token for the account, expiring `ttl` from now.
    pub fn issue(&self, account_id: Uuid) -> Result<String, AuthError> {
        let claims = Claims {
            user_id: account_id.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Resolve a token back to the account id it was issued for.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let data = decode::<serde_json::Value>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token validation failed");
                AuthError::Unauthenticated("invalid token")
            })?;

        data.claims
            .get("user_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or(AuthError::Unauthenticated("invalid user_id in token"))
    }
}
