//! # balance-gateway
//!
//! Account balance lookups over two transports sharing one listener: a
//! request/response HTTP endpoint and a push-capable WebSocket channel.
//!
//! Both transports resolve through the same [`service::BalanceService`],
//! which wraps an injected [`domain::BalanceResolver`]. A WebSocket
//! `balanceRequest` therefore returns exactly what `POST /api/balance`
//! returns for the same account.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Bridge (ws/) ──── ConnectionRegistry (domain/)
//!     │
//!     ├── BalanceService (service/)
//!     │
//!     └── BalanceResolver (domain/)
//!           ├── InMemoryBalanceResolver
//!           └── PostgresBalanceResolver (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the full application router: REST routes plus the `/ws`
/// upgrade endpoint, with tracing and permissive CORS.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
