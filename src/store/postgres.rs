//! PostgreSQL Balance Store
//!
//! One row per wallet in the `wallets` table. Mutations run inside a
//! transaction that takes a row lock with `SELECT ... FOR UPDATE`, so writers
//! to the same wallet queue on that row while other wallets proceed in
//! parallel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Amount, Balance, BalanceError, OperationContext, OperationKind, Wallet};

use super::BalanceStore;

impl From<sqlx::Error> for BalanceError {
    fn from(err: sqlx::Error) -> Self {
        BalanceError::StoreUnavailable(err.to_string())
    }
}

/// Balance store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgBalanceStore {
    pool: PgPool,
}

impl PgBalanceStore {
    /// Create a new PgBalanceStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_balance(&self, wallet_id: Uuid) -> Result<Balance, BalanceError> {
        let balance: Option<i64> = sqlx::query_scalar("SELECT balance FROM wallets WHERE id = $1")
            .bind(wallet_id)
            .fetch_optional(&self.pool)
            .await?;

        let balance = balance.ok_or(BalanceError::NotFound(wallet_id))?;
        stored_balance(wallet_id, balance)
    }

    async fn fetch_wallet(&self, wallet_id: Uuid) -> Result<Wallet, BalanceError> {
        let row: Option<(Uuid, i64, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, balance, created_at, updated_at
            FROM wallets
            WHERE id = $1
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&self.pool)
        .await?;

        let (id, balance, created_at, updated_at) = row.ok_or(BalanceError::NotFound(wallet_id))?;

        Ok(Wallet {
            id,
            balance: stored_balance(id, balance)?,
            created_at,
            updated_at,
        })
    }

    async fn apply_locked(
        &self,
        wallet_id: Uuid,
        kind: OperationKind,
        amount: Amount,
    ) -> Result<Balance, BalanceError> {
        // Dropping `tx` before commit (early return or deadline) rolls back.
        let mut tx = self.pool.begin().await?;

        let current: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM wallets WHERE id = $1 FOR UPDATE")
                .bind(wallet_id)
                .fetch_optional(&mut *tx)
                .await?;

        let current = current.ok_or(BalanceError::NotFound(wallet_id))?;
        let current = stored_balance(wallet_id, current)?;

        // A rejected operation returns here and the dropped `tx` rolls back.
        let new_balance = kind.apply(current, amount)?;

        let result = sqlx::query(
            r#"
            UPDATE wallets
            SET balance = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(new_balance.value())
        .bind(wallet_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BalanceError::StoreUnavailable(format!(
                "failed to update wallet {}",
                wallet_id
            )));
        }

        tx.commit().await?;

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
        let result = sqlx::query(
            r#"
            INSERT INTO wallets (id, balance, created_at, updated_at)
            VALUES ($1, 0, NOW(), NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(wallet_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// The column carries a CHECK (balance >= 0); anything else is corruption.
fn stored_balance(wallet_id: Uuid, raw: i64) -> Result<Balance, BalanceError> {
    Balance::new(raw).map_err(|_| {
        BalanceError::StoreUnavailable(format!(
            "wallet {} has invalid stored balance {}",
            wallet_id, raw
        ))
    })
}

#[async_trait]
impl BalanceStore for PgBalanceStore {
    async fn read(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
    ) -> Result<Balance, BalanceError> {
        ctx.run_until_deadline(self.fetch_balance(wallet_id)).await
    }

    async fn wallet(
        &self,
        ctx: &OperationContext,
        wallet_id: Uuid,
    ) -> Result<Wallet, BalanceError> {
        ctx.run_until_deadline(self.fetch_wallet(wallet_id)).await
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

    #[test]
    fn test_stored_balance_accepts_non_negative() {
        let id = Uuid::new_v4();
        assert_eq!(stored_balance(id, 0).unwrap(), Balance::zero());
        assert_eq!(stored_balance(id, 1700).unwrap().value(), 1700);
    }

    #[test]
    fn test_stored_balance_rejects_negative() {
        let err = stored_balance(Uuid::new_v4(), -1).unwrap_err();
        assert!(matches!(err, BalanceError::StoreUnavailable(_)));
    }

    #[test]
    fn test_sqlx_error_maps_to_store_unavailable() {
        let err: BalanceError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, BalanceError::StoreUnavailable(_)));
    }
}
