//! wallet-balance Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod service;
pub mod store;

mod error;

pub use config::Config;
pub use domain::{Amount, Balance, BalanceError, Operation, OperationContext, OperationKind, Wallet};
pub use error::{AppError, AppResult};
pub use service::BalanceService;
pub use store::{BalanceStore, InMemoryBalanceStore, PgBalanceStore};
