//! Shared helpers for integration tests: an in-process server on an
//! ephemeral port and deterministic resolver stubs.

#![allow(dead_code, clippy::panic)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use balance_gateway::app_state::AppState;
use balance_gateway::build_app;
use balance_gateway::domain::{Balance, BalanceResolver, ConnectionState, InMemoryBalanceResolver};
use balance_gateway::error::GatewayError;
use balance_gateway::ws::ConnectionOptions;

/// WebSocket client stream type.
pub type WsClient =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Running server plus the state it was built with.
#[derive(Debug)]
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: AppState,
}

impl TestApp {
    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub async fn connect_ws(&self) -> WsClient {
        let Ok((ws, _)) = tokio_tungstenite::connect_async(self.ws_url()).await else {
            panic!("ws connect failed");
        };
        ws
    }

    /// Polls the registry until it holds exactly `expected` open
    /// connections.
    pub async fn wait_for_connections(&self, expected: usize) -> bool {
        let registry = &self.state.connections;
        for _ in 0..100 {
            if registry.len().await == expected
                && registry.count_in_state(ConnectionState::Open).await == expected
            {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

/// Starts the full router on `127.0.0.1:0`.
pub async fn spawn_app(resolver: Arc<dyn BalanceResolver>, options: ConnectionOptions) -> TestApp {
    let state = AppState::new(resolver, options);
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let app = build_app(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    TestApp { addr, state }
}

/// Server with the default options over an in-memory resolver.
pub async fn spawn_default(accounts: &[(&str, f64)]) -> TestApp {
    spawn_app(in_memory(accounts), ConnectionOptions::default()).await
}

pub fn in_memory(accounts: &[(&str, f64)]) -> Arc<dyn BalanceResolver> {
    Arc::new(InMemoryBalanceResolver::with_accounts(
        accounts
            .iter()
            .map(|(number, balance)| ((*number).to_string(), Balance::new(*balance))),
    ))
}

/// Resolver that waits a fixed per-account latency before answering.
#[derive(Debug, Default)]
pub struct DelayedResolver {
    accounts: HashMap<String, (Balance, Duration)>,
}

impl DelayedResolver {
    pub fn with(mut self, number: &str, balance: f64, delay: Duration) -> Self {
        self.accounts
            .insert(number.to_string(), (Balance::new(balance), delay));
        self
    }
}

impl BalanceResolver for DelayedResolver {
    fn resolve<'a>(&'a self, mobile_number: &'a str) -> BoxFuture<'a, Result<Balance, GatewayError>> {
        Box::pin(async move {
            let Some((balance, delay)) = self.accounts.get(mobile_number) else {
                return Err(GatewayError::AccountNotFound(mobile_number.to_string()));
            };
            tokio::time::sleep(*delay).await;
            Ok(*balance)
        })
    }
}

/// Resolver whose backend is always down.
#[derive(Debug, Default)]
pub struct UnavailableResolver;

impl BalanceResolver for UnavailableResolver {
    fn resolve<'a>(&'a self, _mobile_number: &'a str) -> BoxFuture<'a, Result<Balance, GatewayError>> {
        Box::pin(async {
            Err::<Balance, _>(GatewayError::ResolverUnavailable(
                "connection refused".to_string(),
            ))
        })
    }
}

pub async fn send_text(ws: &mut WsClient, text: &str) {
    use futures_util::SinkExt;
    if ws.send(Message::text(text.to_string())).await.is_err() {
        panic!("ws send failed");
    }
}

/// Waits for the next text frame and parses it as JSON.
pub async fn next_json(ws: &mut WsClient) -> Value {
    loop {
        let Ok(Some(Ok(message))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await
        else {
            panic!("expected a frame");
        };
        if let Message::Text(text) = message {
            let Ok(value) = serde_json::from_str(text.as_str()) else {
                panic!("frame is not JSON: {text}");
            };
            return value;
        }
    }
}

/// Asserts that no frame arrives within `window`.
pub async fn expect_silence(ws: &mut WsClient, window: Duration) {
    if let Ok(frame) = tokio::time::timeout(window, ws.next()).await {
        panic!("expected no frame, got {frame:?}");
    }
}
