//! Balance Service module
//!
//! Validation and create-on-demand orchestration above the balance store.

mod balance_service;


pub use balance_service::BalanceService;
