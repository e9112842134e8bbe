//! Balance lookup handler.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{BalanceQuery, BalanceResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /api/balance` — Resolve an account balance.
///
/// # Errors
///
/// Returns [`GatewayError`] if the body is invalid, the account is unknown,
/// or the balance backend fails.
#[utoipa::path(
    post,
    path = "/api/balance",
    tag = "Balance",
    summary = "Check account balance",
    description = "Resolves the balance of the account registered under `mobileNumber`. \
                   The WebSocket `balanceRequest` message resolves through the same service.",
    request_body = BalanceQuery,
    responses(
        (status = 200, description = "Balance resolved", body = BalanceResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 503, description = "Balance backend unavailable", body = ErrorResponse),
    )
)]
pub async fn check_balance(
    State(state): State<AppState>,
    body: Result<Json<BalanceQuery>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(query) = body.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;

    let balance = state
        .balance_service
        .check_balance(&query.mobile_number)
        .await?;

    Ok(Json(BalanceResponse { balance }))
}

/// Balance routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/balance", post(check_balance))
}
