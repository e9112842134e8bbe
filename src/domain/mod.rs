//! Domain layer: balances, connection identity, the connection registry,
//! and the balance resolver capability.
//!
//! The resolver is the one dependency shared by the HTTP endpoint and the
//! WebSocket bridge. It is injected as an `Arc<dyn BalanceResolver>` so that
//! both transports see the same accounts and the same failures.

pub mod balance;
pub mod connection_id;
pub mod connection_registry;
pub mod resolver;

pub use balance::Balance;
pub use connection_id::ConnectionId;
pub use connection_registry::{ConnectionEntry, ConnectionRegistry, ConnectionState};
pub use resolver::{BalanceResolver, InMemoryBalanceResolver};
