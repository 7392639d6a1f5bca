//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::BalanceError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Domain errors
    #[error(transparent)]
    Balance(#[from] BalanceError),
}

/// Error response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// HTTP status and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::Balance(err) => match err {
                BalanceError::NotFound(_) => (StatusCode::NOT_FOUND, "wallet_not_found"),
                BalanceError::InsufficientFunds { .. } => {
                    (StatusCode::BAD_REQUEST, "insufficient_funds")
                }
                BalanceError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "invalid_amount"),
                BalanceError::InvalidOperationKind(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_operation_type")
                }
                BalanceError::Cancelled => (StatusCode::INTERNAL_SERVER_ERROR, "cancelled"),
                BalanceError::StoreUnavailable(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "store_unavailable")
                }
                BalanceError::ProvisioningFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        // Client errors carry their detail; server errors are logged, not echoed.
        let (error, details) = if status.is_server_error() {
            tracing::error!(error = %self, error_code, "Request failed");
            ("Internal server error".to_string(), None)
        } else {
            let details = match &self {
                AppError::InvalidRequest(msg) => Some(msg.clone()),
                AppError::Balance(BalanceError::NotFound(id)) => Some(id.to_string()),
                AppError::Balance(BalanceError::InvalidAmount(msg)) => Some(msg.clone()),
                AppError::Balance(BalanceError::InvalidOperationKind(kind)) => Some(kind.clone()),
                _ => None,
            };
            (self.to_string(), details)
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
