//! In-memory Balance Store
//!
//! Each wallet lives behind its own async mutex, which plays the role of the
//! row lock. The outer map lock is only held long enough to look up or insert
//! a row, never across a mutation.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::{Amount, Balance, BalanceError, OperationContext, OperationKind, Wallet};

use super::BalanceStore;

type WalletRow = Arc<Mutex<Wallet>>;

/// Balance store kept in process memory.
///
/// Used for local runs and for exercising the service without a database.
#[derive(Debug, Default)]
pub struct InMemoryBalanceStore {
    rows: RwLock<HashMap<Uuid, WalletRow>>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn row(&self, wallet_id: Uuid) -> Result<WalletRow, BalanceError> {
        self.rows
            .read()
            .await
            .get(&wallet_id)
            .cloned()
            .ok_or(BalanceError::NotFound(wallet_id))
    }

    async fn snapshot(&self, wallet_id: Uuid) -> Result<Wallet, BalanceError> {
        let row = self.row(wallet_id).await?;
        let wallet = row.lock().await;
        Ok(wallet.clone())
    }

    async fn apply_locked(
        &self,
        wallet_id: Uuid,
        kind: OperationKind,
        amount: Amount,
    ) -> Result<Balance, BalanceError> {
        let row = self.row(wallet_id).await?;
        let mut wallet = row.lock().await;

        // No await from here on: the write below lands whole or not at all.
        let new_balance = kind.apply(wallet.balance, amount)?;
        wallet.balance = new_balance;
        wallet.updated_at = Utc::now();

        tracing::debug!(
            wallet_id = %wallet_id,
            kind = %kind,
            amount = %amount,
            balance = %new_balance,
            "Balance updated"
        );

        Ok(new_balance)
    }

    async fn insert_if_absent(&self, wallet_id: Uuid) -> Result<bool, BalanceError> {
        let mut rows = self.rows.write().await;
        match rows.entry(wallet_id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(Wallet::new(wallet_id))));
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn read(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
    ) -> Result<Balance, BalanceError> {
        ctx.run_until_deadline(self.snapshot(wallet_id))
            .await
            .map(|wallet| wallet.balance)
    }

    async fn wallet(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
    ) -> Result<Wallet, BalanceError> {
        ctx.run_until_deadline(self.snapshot(wallet_id)).await
    }

    async fn atomic_apply(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
        kind: OperationKind,
        amount: Amount,
    ) -> Result<Balance, BalanceError> {
        ctx.run_until_deadline(self.apply_locked(wallet_id, kind, amount))
            .await
    }

    async fn create(&self, ctx: &OperationContext, wallet_id: Uuid) -> Result<bool, BalanceError> {
        ctx.run_until_deadline(self.insert_if_absent(wallet_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn amount(value: i64) -> Amount {
        Amount::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let store = InMemoryBalanceStore::new();
        let ctx = OperationContext::new();
        let id = Uuid::new_v4();

        assert!(store.create(&ctx, id).await.unwrap());
        assert!(!store.create(&ctx, id).await.unwrap());
        assert_eq!(store.read(&ctx, id).await.unwrap(), Balance::zero());
    }

    #[tokio::test]
    async fn test_missing_wallet_is_not_found() {
        let store = InMemoryBalanceStore::new();
        let ctx = OperationContext::new();
        let id = Uuid::new_v4();

        assert_eq!(store.read(&ctx, id).await, Err(BalanceError::NotFound(id)));
        assert_eq!(
            store
                .atomic_apply(&ctx, id, OperationKind::Deposit, amount(10))
                .await,
            Err(BalanceError::NotFound(id))
        );

        // atomic_apply never creates the row
        assert_eq!(store.read(&ctx, id).await, Err(BalanceError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_apply_updates_balance_and_timestamp() {
        let store = InMemoryBalanceStore::new();
        let ctx = OperationContext::new();
        let id = Uuid::new_v4();
        store.create(&ctx, id).await.unwrap();
        let before = store.wallet(&ctx, id).await.unwrap();

        let balance = store
            .atomic_apply(&ctx, id, OperationKind::Deposit, amount(1000))
            .await
            .unwrap();
        assert_eq!(balance.value(), 1000);

        let balance = store
            .atomic_apply(&ctx, id, OperationKind::Withdraw, amount(300))
            .await
            .unwrap();
        assert_eq!(balance.value(), 700);

        let after = store.wallet(&ctx, id).await.unwrap();
        assert_eq!(after.balance.value(), 700);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_overdraft_leaves_balance_unchanged() {
        let store = InMemoryBalanceStore::new();
        let ctx = OperationContext::new();
        let id = Uuid::new_v4();
        store.create(&ctx, id).await.unwrap();
        store
            .atomic_apply(&ctx, id, OperationKind::Deposit, amount(700))
            .await
            .unwrap();

        let result = store
            .atomic_apply(&ctx, id, OperationKind::Withdraw, amount(1000))
            .await;
        assert_eq!(result, Err(BalanceError::insufficient_funds(1000, 700)));
        assert_eq!(store.read(&ctx, id).await.unwrap().value(), 700);
    }

    #[tokio::test]
    async fn test_overflowing_deposit_leaves_balance_unchanged() {
        let store = InMemoryBalanceStore::new();
        let ctx = OperationContext::new();
        let id = Uuid::new_v4();
        store.create(&ctx, id).await.unwrap();
        store
            .atomic_apply(&ctx, id, OperationKind::Deposit, amount(i64::MAX))
            .await
            .unwrap();
        let before = store.wallet(&ctx, id).await.unwrap();

        let result = store
            .atomic_apply(&ctx, id, OperationKind::Deposit, amount(1))
            .await;
        assert!(matches!(result, Err(BalanceError::InvalidAmount(_))));

        let after = store.wallet(&ctx, id).await.unwrap();
        assert_eq!(after.balance.value(), i64::MAX);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_deadline_while_row_locked_cancels_without_write() {
        let store = InMemoryBalanceStore::new();
        let ctx = OperationContext::new();
        let id = Uuid::new_v4();
        store.create(&ctx, id).await.unwrap();
        store
            .atomic_apply(&ctx, id, OperationKind::Deposit, amount(500))
            .await
            .unwrap();

        let row = store.row(id).await.unwrap();
        let held = row.lock().await;

        let short = OperationContext::new().with_timeout(Duration::from_millis(30));
        let result = store
            .atomic_apply(&short, id, OperationKind::Withdraw, amount(100))
            .await;
        assert_eq!(result, Err(BalanceError::Cancelled));

        drop(held);
        assert_eq!(store.read(&ctx, id).await.unwrap().value(), 500);
    }

    #[tokio::test]
    async fn test_locked_row_does_not_block_other_wallets() {
        let store = InMemoryBalanceStore::new();
        let ctx = OperationContext::new();
        let busy = Uuid::new_v4();
        let idle = Uuid::new_v4();
        store.create(&ctx, busy).await.unwrap();
        store.create(&ctx, idle).await.unwrap();

        let row = store.row(busy).await.unwrap();
        let _held = row.lock().await;

        let short = OperationContext::new().with_timeout(Duration::from_millis(200));
        let balance = store
            .atomic_apply(&short, idle, OperationKind::Deposit, amount(5))
            .await
            .unwrap();
        assert_eq!(balance.value(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_deposits_are_not_lost() {
        let store = Arc::new(InMemoryBalanceStore::new());
        let ctx = OperationContext::new();
        let id = Uuid::new_v4();
        store.create(&ctx, id).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..300 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .atomic_apply(&OperationContext::new(), id, OperationKind::Deposit, amount(1))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.read(&ctx, id).await.unwrap().value(), 300);
    }
}
