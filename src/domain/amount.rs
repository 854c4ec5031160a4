//! Amount type
//!
//! Domain primitives for coin amounts with business rule validation.
//! All amounts are validated at construction time, ensuring invalid values
//! cannot exist in the system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount represents a validated, strictly positive number of coins.
///
/// # Example
/// ```
/// use merch_shop::domain::Amount;
///
/// let amount = Amount::new(100).unwrap();
/// assert_eq!(amount.value(), 100);
/// assert!(Amount::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

/// Errors that can occur when creating an Amount or Balance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be positive (got {0})")]
    NotPositive(i64),

    #[error("balance cannot be negative (got {0})")]
    Negative(i64),

    #[error("amount overflows the coin range")]
    Overflow,
}

impl Amount {
    /// Create a new Amount.
    ///
    /// # Errors
    /// `AmountError::NotPositive` if value <= 0
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value <= 0 {
            return Err(AmountError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying coin count.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Balance represents an account balance (zero or positive).
/// Unlike Amount, Balance can be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance(i64);

impl Balance {
    /// Create a new balance (zero or positive)
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value < 0 {
            return Err(AmountError::Negative(value));
        }
        Ok(Self(value))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the underlying value
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Check if balance covers the amount
    pub fn is_sufficient_for(&self, amount: &Amount) -> bool {
        self.0 >= amount.value()
    }

    /// Add amount to balance
    pub fn credit(&self, amount: &Amount) -> Result<Balance, AmountError> {
        let new_value = self
            .0
            .checked_add(amount.value())
            .ok_or(AmountError::Overflow)?;
        Balance::new(new_value)
    }

    /// Subtract amount from balance
    pub fn debit(&self, amount: &Amount) -> Result<Balance, AmountError> {
        Balance::new(self.0 - amount.value())
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}
