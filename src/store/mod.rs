//! Balance Store module
//!
//! Durable, concurrency-safe storage of wallet balances keyed by wallet ID.
//! The service layer only ever sees the `BalanceStore` trait.

mod memory;
mod postgres;

pub use memory::InMemoryBalanceStore;
pub use postgres::PgBalanceStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Amount, Balance, BalanceError, OperationContext, OperationKind, Wallet};

/// Capability set of a balance store.
///
/// Every call honours the deadline carried by `ctx`: if it passes before the
/// call commits, the call fails with `BalanceError::Cancelled` and the stored
/// balance is left untouched.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Current committed balance of a wallet.
    ///
    /// Fails with `NotFound` if no wallet exists for `wallet_id`.
    async fn read(&self, ctx: &OperationContext, wallet_id: Uuid) -> Result<Balance, BalanceError>;

    /// Full wallet row, including timestamps.
    async fn wallet(&self, ctx: &OperationContext, wallet_id: Uuid) -> Result<Wallet, BalanceError>;

    /// Apply a deposit or withdrawal under an exclusive per-wallet lock.
    ///
    /// Calls on the same wallet serialize; calls on different wallets do not
    /// block each other. Never creates the wallet: a missing row is
    /// `NotFound`. A withdrawal larger than the balance is
    /// `InsufficientFunds` and writes nothing. Returns the new balance.
    async fn atomic_apply(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
        kind: OperationKind,
        amount: Amount,
    ) -> Result<Balance, BalanceError>;

    /// Insert a zero-balance wallet if absent.
    ///
    /// Returns `true` when a row was inserted and `false` when one already
    /// existed. Repeating the call is never an error.
    async fn create(&self, ctx: &OperationContext, wallet_id: Uuid) -> Result<bool, BalanceError>;
}
