//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{BalanceResolver, ConnectionRegistry};
use crate::service::BalanceService;
use crate::ws::ConnectionOptions;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Balance lookups for both transports.
    pub balance_service: Arc<BalanceService>,
    /// Live WebSocket connections.
    pub connections: Arc<ConnectionRegistry>,
    /// Settings applied to each new WebSocket connection.
    pub ws_options: ConnectionOptions,
}

impl AppState {
    /// Builds state around a resolver with an empty connection registry.
    #[must_use]
    pub fn new(resolver: Arc<dyn BalanceResolver>, ws_options: ConnectionOptions) -> Self {
        Self {
            balance_service: Arc::new(BalanceService::new(resolver)),
            connections: Arc::new(ConnectionRegistry::new()),
            ws_options,
        }
    }
}
