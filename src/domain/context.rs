//! Operation Context
//!
//! Contains metadata about the current operation for tracing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for an operation, used for tracing ledger mutations back to requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// Account resolved from the bearer credential
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            account_id: None,
            correlation_id: None,
        }
    }

    /// Create context with the authenticated account
    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}
