//! balance-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints on a
//! single listener.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use balance_gateway::app_state::AppState;
use balance_gateway::build_app;
use balance_gateway::config::{GatewayConfig, LogFormat};
use balance_gateway::domain::{BalanceResolver, InMemoryBalanceResolver};
use balance_gateway::persistence::{self, PostgresBalanceResolver};
use balance_gateway::ws::ConnectionOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting balance-gateway");

    // Build resolver
    let resolver: Arc<dyn BalanceResolver> = if config.persistence_enabled {
        let pool = persistence::connect(&config)
            .await
            .context("connecting to database")?;
        Arc::new(PostgresBalanceResolver::new(pool))
    } else {
        tracing::info!(
            accounts = config.seed_accounts.len(),
            "persistence disabled; using in-memory balances"
        );
        Arc::new(InMemoryBalanceResolver::with_accounts(
            config.seed_accounts.clone(),
        ))
    };

    // Build application state
    let app_state = AppState::new(
        resolver,
        ConnectionOptions {
            outbound_capacity: config.ws_outbound_capacity,
            error_frames: config.ws_error_frames,
        },
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, build_app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
