//! Domain module
//!
//! Core domain types and business rules.

pub mod amount;
pub mod context;
pub mod error;
pub mod operation;
pub mod wallet;

pub use amount::{Amount, Balance};
pub use context::OperationContext;
pub use error::BalanceError;
pub use operation::{Operation, OperationKind};
pub use wallet::Wallet;
