//! Amount type
//!
//! Domain primitives for monetary values in minor currency units.
//! Both types validate at construction, so an invalid value never
//! reaches the balance store.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::BalanceError;

/// Amount represents a validated mutation amount.
///
/// # Invariants
/// - Value is always strictly positive (> 0)
///
/// # Example
/// ```
/// use wallet_balance::domain::Amount;
///
/// let amount = Amount::new(300).unwrap();
/// assert_eq!(amount.value(), 300);
/// assert!(Amount::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `BalanceError::InvalidAmount` if value <= 0
    pub fn new(value: i64) -> Result<Self, BalanceError> {
        if value <= 0 {
            return Err(BalanceError::InvalidAmount(format!(
                "amount must be greater than zero (got {})",
                value
            )));
        }

        Ok(Self(value))
    }

    /// Get the underlying value in minor units.
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
    type Error = BalanceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Balance represents a wallet balance (zero or positive).
/// Unlike Amount, Balance can be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Balance(i64);

impl Balance {
    /// Create a new balance (zero or positive)
    pub fn new(value: i64) -> Result<Self, BalanceError> {
        if value < 0 {
            return Err(BalanceError::InvalidAmount(format!(
                "balance cannot be negative (got {})",
                value
            )));
        }

        Ok(Self(value))
    }

    /// Create a zero balance
    pub fn zero() -> Self {
        Self(0)
    }

    /// Get the underlying value in minor units
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Check if balance covers a withdrawal of `amount`
    pub fn is_sufficient_for(&self, amount: Amount) -> bool {
        self.0 >= amount.value()
    }

    /// Add amount to balance
    pub fn credit(&self, amount: Amount) -> Result<Balance, BalanceError> {
        self.0
            .checked_add(amount.value())
            .map(Self)
            .ok_or_else(|| {
                BalanceError::InvalidAmount(format!(
                    "deposit of {} would overflow balance {}",
                    amount, self.0
                ))
            })
    }

    /// Subtract amount from balance
    pub fn debit(&self, amount: Amount) -> Result<Balance, BalanceError> {
        if !self.is_sufficient_for(amount) {
            return Err(BalanceError::insufficient_funds(amount.value(), self.0));
        }

        Ok(Self(self.0 - amount.value()))
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

impl TryFrom<i64> for Balance {
    type Error = BalanceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Balance::new(value)
    }
}

impl From<Balance> for i64 {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}
