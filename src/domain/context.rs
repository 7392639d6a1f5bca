//! Operation Context
//!
//! Carries request metadata and the deadline every store call must honour.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

use super::BalanceError;

/// Context for an operation, used for tracing and cancellation.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Correlation ID for request tracing
    pub correlation_id: Option<Uuid>,

    /// Point in time after which the operation must give up
    pub deadline: Option<Instant>,
}

impl OperationContext {
    /// Create a new empty context (no deadline)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Create context with an absolute deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Create context whose deadline is `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }

    /// Whether the deadline has already passed
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Drive `fut` to completion unless the deadline passes first.
    ///
    /// An already expired deadline fails without polling `fut`. When the
    /// deadline fires mid-flight `fut` is dropped, which releases any lock it
    /// holds and rolls back any open transaction.
    pub async fn run_until_deadline<F, T>(&self, fut: F) -> Result<T, BalanceError>
    where
        F: Future<Output = Result<T, BalanceError>>,
    {
        let Some(deadline) = self.deadline else {
            return fut.await;
        };

        if self.is_expired() {
            return Err(BalanceError::Cancelled);
        }

        match tokio::time::timeout_at(deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(BalanceError::Cancelled),
        }
    }
}
