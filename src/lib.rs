//! merch_shop Library
//!
//! Coin ledger and merch shop backend. Re-exports modules for the server
//! binary, the load-test tool and integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod projection;
pub mod store;

pub use config::Config;
pub use domain::{Amount, AmountError, Balance, DomainError, OperationContext};
pub use error::{AppError, AppResult};
