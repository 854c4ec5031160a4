//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, State,
    },
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::domain::OperationContext;
use crate::error::AppError;
use crate::handlers::{PurchaseCommand, TransferCommand};
use crate::projection::AccountInfo;

use super::middleware::{auth_middleware, logging_middleware, AuthenticatedAccount};
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    #[serde(default)]
    pub to_user: String,
    #[serde(default)]
    pub amount: i64,
}

// =========================================================================
// Router
// =========================================================================

/// Build the complete application router
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/info", get(info))
        .route("/sendCoin", post(send_coin))
        .route("/buy/:item", get(buy))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new().route("/auth", post(auth)).merge(protected);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Malformed JSON bodies are always a 400, whatever axum would pick.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))
}

// =========================================================================
// POST /api/auth
// =========================================================================

/// Log in, provisioning the account on first sight
async fn auth(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let request = json_body(payload)?;

    let token = state
        .identity
        .authenticate(&request.username, &request.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// =========================================================================
// GET /api/info
// =========================================================================

async fn info(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> Result<Json<AccountInfo>, AppError> {
    let info = state.projection.account_info(caller.account_id).await?;
    Ok(Json(info))
}

// =========================================================================
// POST /api/sendCoin
// =========================================================================

async fn send_coin(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<SendCoinRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let request = json_body(payload)?;

    let command = TransferCommand::new(caller.account_id, request.to_user, request.amount);
    state.transfers.execute(command, &context).await?;

    Ok(StatusCode::OK)
}

// =========================================================================
// GET /api/buy/:item
// =========================================================================

async fn buy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Extension(context): Extension<OperationContext>,
    item: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(item) = item.map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))?;
    let command = PurchaseCommand::new(caller.account_id, item);
    state.purchases.execute(command, &context).await?;

    Ok(StatusCode::OK)
}
