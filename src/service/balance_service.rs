//! Balance Service
//!
//! Validates operations and provisions wallets on demand before mutating
//! them through the store.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Balance, BalanceError, Operation, OperationContext, Wallet};
use crate::store::BalanceStore;

/// Orchestrates reads, provisioning and mutations on top of a `BalanceStore`.
#[derive(Clone)]
pub struct BalanceService {
    store: Arc<dyn BalanceStore>,
}

impl BalanceService {
    pub fn new(store: Arc<dyn BalanceStore>) -> Self {
        Self { store }
    }

    /// Current balance of a wallet. `NotFound` is returned unchanged.
    pub async fn get_balance(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
    ) -> Result<Balance, BalanceError> {
        self.store.read(ctx, wallet_id).await
    }

    /// Full wallet record. `NotFound` is returned unchanged.
    pub async fn get_wallet(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
    ) -> Result<Wallet, BalanceError> {
        self.store.wallet(ctx, wallet_id).await
    }

    /// Create a zero-balance wallet. Returns `false` if it already existed.
    pub async fn provision(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
    ) -> Result<bool, BalanceError> {
        let created = self.store.create(ctx, wallet_id).await?;
        if created {
            tracing::info!(wallet_id = %wallet_id, "Wallet provisioned");
        }
        Ok(created)
    }

    /// Validate raw input and apply it.
    ///
    /// The kind is checked first, then the amount; neither failure touches the
    /// store.
    pub async fn process(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
        kind: &str,
        amount: i64,
    ) -> Result<Balance, BalanceError> {
        let operation = Operation::parse(wallet_id, kind, amount)?;
        self.execute(ctx, operation).await
    }

    pub async fn deposit(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
        amount: i64,
    ) -> Result<Balance, BalanceError> {
        self.execute(ctx, Operation::deposit(wallet_id, amount)?).await
    }

    pub async fn withdraw(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
        amount: i64,
    ) -> Result<Balance, BalanceError> {
        self.execute(ctx, Operation::withdraw(wallet_id, amount)?).await
    }

    /// Apply a validated operation, provisioning the wallet if it is missing.
    ///
    /// A missing wallet is created and the mutation retried exactly once. If
    /// the retry still finds no wallet the failure is escalated as
    /// `ProvisioningFailed` instead of looping.
    pub async fn execute(
        &self,
        ctx: &OperationContext,
        operation: Operation,
    ) -> Result<Balance, BalanceError> {
        let Operation {
            wallet_id,
            kind,
            amount,
        } = operation;

        match self.store.atomic_apply(ctx, wallet_id, kind, amount).await {
            Err(err) if err.is_not_found() => {}
            other => return other,
        }

        tracing::debug!(
            wallet_id = %wallet_id,
            correlation_id = ?ctx.correlation_id,
            "Wallet not found, provisioning before retry"
        );
        self.provision(ctx, wallet_id).await?;

        match self.store.atomic_apply(ctx, wallet_id, kind, amount).await {
            Err(err) if err.is_not_found() => {
                tracing::error!(
                    wallet_id = %wallet_id,
                    "Wallet still missing after provisioning"
                );
                Err(BalanceError::ProvisioningFailed(wallet_id))
            }
            other => other,
        }
    }
}
