//! Auth module
//!
//! Identity Service: password hashing, bearer token issuance and validation.

mod error;
mod password;
mod service;
mod token;

pub use error::AuthError;
pub use password::PasswordHasher;
pub use service::IdentityService;
pub use token::{Claims, TokenIssuer};
