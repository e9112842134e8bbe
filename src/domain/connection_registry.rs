//! Tracks live WebSocket connections from upgrade to close.
//!
//! [`ConnectionRegistry`] stores one [`ConnectionEntry`] per connection in a
//! `HashMap` behind a [`tokio::sync::RwLock`]. Connections are independent;
//! the registry exists for lifecycle observation only and is never used to
//! route messages between connections.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::ConnectionId;

/// Lifecycle state of a realtime connection.
///
/// Transitions are strictly `Connecting -> Open -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Transport upgraded, outbound writer not yet running.
    Connecting,
    /// Accepting inbound messages.
    Open,
    /// Closed by either peer; sends are no-ops.
    Closed,
}

/// Registry record for a single connection.
#[derive(Debug, Clone)]
pub struct ConnectionEntry {
    /// Connection identity.
    pub id: ConnectionId,
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// When the connection was registered.
    pub connected_at: DateTime<Utc>,
    /// When the connection became [`ConnectionState::Open`].
    pub opened_at: Option<DateTime<Utc>>,
}

/// Set of currently live connections.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, ConnectionEntry>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a freshly upgraded connection in the
    /// [`ConnectionState::Connecting`] state and returns its identity.
    pub async fn register(&self) -> ConnectionId {
        let id = ConnectionId::new();
        let entry = ConnectionEntry {
            id,
            state: ConnectionState::Connecting,
            connected_at: Utc::now(),
            opened_at: None,
        };
        let mut map = self.connections.write().await;
        map.insert(id, entry);
        let live_connections = map.len();
        drop(map);

        tracing::info!(connection_id = %id, live_connections, "ws connection registered");
        id
    }

    /// Moves a connection from `Connecting` to `Open`.
    ///
    /// Returns `false` if the connection is unknown or not in the
    /// `Connecting` state.
    pub async fn mark_open(&self, id: ConnectionId) -> bool {
        let mut map = self.connections.write().await;
        match map.get_mut(&id) {
            Some(entry) if entry.state == ConnectionState::Connecting => {
                entry.state = ConnectionState::Open;
                entry.opened_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }

    /// Removes a connection and returns its final record in the
    /// [`ConnectionState::Closed`] state.
    ///
    /// Deregistering an unknown or already-removed connection returns
    /// `None`.
    pub async fn deregister(&self, id: ConnectionId) -> Option<ConnectionEntry> {
        let mut map = self.connections.write().await;
        let mut entry = map.remove(&id)?;
        let live_connections = map.len();
        drop(map);

        entry.state = ConnectionState::Closed;
        let lifetime_ms = (Utc::now() - entry.connected_at).num_milliseconds();
        tracing::info!(
            connection_id = %id,
            lifetime_ms,
            live_connections,
            "ws connection deregistered"
        );
        Some(entry)
    }

    /// Returns a snapshot of the entry for `id`, if registered.
    pub async fn get(&self, id: ConnectionId) -> Option<ConnectionEntry> {
        self.connections.read().await.get(&id).cloned()
    }

    /// Returns the current state of `id`. Unregistered connections report
    /// [`ConnectionState::Closed`].
    pub async fn state(&self, id: ConnectionId) -> ConnectionState {
        self.connections
            .read()
            .await
            .get(&id)
            .map_or(ConnectionState::Closed, |entry| entry.state)
    }

    /// Returns the number of registered connections in `state`.
    pub async fn count_in_state(&self, state: ConnectionState) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|entry| entry.state == state)
            .count()
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no connections are registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
