//! Domain Error Types
//!
//! Failure taxonomy shared by the balance store and the balance service.

use thiserror::Error;
use uuid::Uuid;

/// Errors produced while reading, provisioning or mutating a wallet balance.
///
/// Input errors (`InvalidAmount`, `InvalidOperationKind`) are raised before any
/// store call is made. `NotFound` on a mutation is recoverable by the service's
/// auto-provision path; everything else is surfaced to the caller as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    /// No wallet row exists for the identifier
    #[error("Wallet not found: {0}")]
    NotFound(Uuid),

    /// Withdrawal exceeds the current balance
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },

    /// Amount is zero, negative, or would overflow the balance
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Operation kind is neither DEPOSIT nor WITHDRAW
    #[error("Invalid operation type: {0}")]
    InvalidOperationKind(String),

    /// Deadline elapsed before the operation committed
    #[error("Operation cancelled: deadline exceeded")]
    Cancelled,

    /// Underlying storage failed
    #[error("Balance store unavailable: {0}")]
    StoreUnavailable(String),

    /// Wallet still missing after it was provisioned
    #[error("Wallet {0} missing after provisioning")]
    ProvisioningFailed(Uuid),
}

impl BalanceError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(requested: i64, available: i64) -> Self {
        Self::InsufficientFunds {
            requested,
            available,
        }
    }

    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InsufficientFunds { .. } | Self::InvalidAmount(_) | Self::InvalidOperationKind(_)
        )
    }

    /// Check if this error means the wallet row does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
