//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Extension, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Operation, OperationContext, OperationKind};
use crate::error::{AppError, AppResult};

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    #[serde(alias = "valletId")]
    pub wallet_id: Uuid,
    pub operation_type: String,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    pub wallet_id: Uuid,
    pub operation_type: OperationKind,
    pub amount: i64,
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub wallet_id: Uuid,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResponse {
    pub wallet_id: Uuid,
    pub created: bool,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/wallet", post(process_operation))
        .route("/wallets/:wallet_id", get(get_wallet).post(provision_wallet))
}

fn wallet_id_from_path(path: Result<Path<Uuid>, PathRejection>) -> AppResult<Uuid> {
    path.map(|Path(wallet_id)| wallet_id)
        .map_err(|_| AppError::InvalidRequest("invalid wallet ID".to_string()))
}

// =========================================================================
// POST /wallet
// =========================================================================

/// Deposit into or withdraw from a wallet, provisioning it if needed
async fn process_operation(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> AppResult<Json<OperationResponse>> {
    let Json(request) =
        payload.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;

    let operation = Operation::parse(request.wallet_id, &request.operation_type, request.amount)?;
    let balance = state
        .service
        .execute(&context, operation)
        .await
        .map_err(|err| {
            if err.is_client_error() {
                tracing::info!(
                    wallet_id = %request.wallet_id,
                    operation_type = %operation.kind,
                    amount = request.amount,
                    error = %err,
                    "Operation rejected"
                );
            }
            err
        })?;

    tracing::info!(
        wallet_id = %request.wallet_id,
        operation_type = %operation.kind,
        amount = request.amount,
        balance = %balance,
        correlation_id = ?context.correlation_id,
        "Operation completed"
    );

    Ok(Json(OperationResponse {
        wallet_id: request.wallet_id,
        operation_type: operation.kind,
        amount: request.amount,
        balance: balance.value(),
    }))
}

// =========================================================================
// GET /wallets/:wallet_id
// =========================================================================

/// Get wallet balance
async fn get_wallet(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<WalletResponse>> {
    let wallet_id = wallet_id_from_path(path)?;

    let wallet = state.service.get_wallet(&context, wallet_id).await?;

    Ok(Json(WalletResponse {
        wallet_id: wallet.id,
        balance: wallet.balance.value(),
        created_at: wallet.created_at,
        updated_at: wallet.updated_at,
    }))
}

// =========================================================================
// POST /wallets/:wallet_id
// =========================================================================

/// Provision an empty wallet; repeating the call is harmless
async fn provision_wallet(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<(StatusCode, Json<ProvisionResponse>)> {
    let wallet_id = wallet_id_from_path(path)?;

    let created = state.service.provision(&context, wallet_id).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(ProvisionResponse { wallet_id, created })))
}
