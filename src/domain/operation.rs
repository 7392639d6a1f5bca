//! Balance operations
//!
//! An `Operation` is never persisted; only its effect on the wallet row is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Amount, Balance, BalanceError};

/// The two supported balance-mutating operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Deposit,
    Withdraw,
}

impl OperationKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
        }
    }

    /// Compute the candidate balance after applying `amount`.
    ///
    /// A withdrawal larger than the balance fails with `InsufficientFunds`
    /// and produces no new balance.
    pub fn apply(&self, balance: Balance, amount: Amount) -> Result<Balance, BalanceError> {
        match self {
            Self::Deposit => balance.credit(amount),
            Self::Withdraw => balance.debit(amount),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = BalanceError;

    /// Wire names match exactly; no trimming or case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(Self::Deposit),
            "WITHDRAW" => Ok(Self::Withdraw),
            _ => Err(BalanceError::InvalidOperationKind(s.to_string())),
        }
    }
}

/// One mutation request against a single wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub wallet_id: Uuid,
    pub kind: OperationKind,
    pub amount: Amount,
}

impl Operation {
    pub fn new(wallet_id: Uuid, kind: OperationKind, amount: Amount) -> Self {
        Self {
            wallet_id,
            kind,
            amount,
        }
    }

    /// Build an operation from unvalidated input.
    ///
    /// The kind is checked before the amount, so a request that is wrong on
    /// both counts reports `InvalidOperationKind`.
    pub fn parse(wallet_id: Uuid, kind: &str, amount: i64) -> Result<Self, BalanceError> {
        let kind: OperationKind = kind.parse()?;
        let amount = Amount::new(amount)?;
        Ok(Self::new(wallet_id, kind, amount))
    }

    pub fn deposit(wallet_id: Uuid, amount: i64) -> Result<Self, BalanceError> {
        Ok(Self::new(wallet_id, OperationKind::Deposit, Amount::new(amount)?))
    }

    pub fn withdraw(wallet_id: Uuid, amount: i64) -> Result<Self, BalanceError> {
        Ok(Self::new(wallet_id, OperationKind::Withdraw, Amount::new(amount)?))
    }
}
