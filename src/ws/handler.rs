//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let service = Arc::clone(&state.balance_service);
    let registry = Arc::clone(&state.connections);
    let options = state.ws_options;

    ws.on_failed_upgrade(|err| tracing::warn!(error = %err, "ws upgrade failed"))
        .on_upgrade(move |socket| run_connection(socket, service, registry, options))
}
