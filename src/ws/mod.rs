//! WebSocket layer: upgrade handling, the per-connection bridge, and the
//! JSON message protocol.
//!
//! The endpoint at `/ws` shares the HTTP listener. Balance requests received
//! here go through the same [`crate::service::BalanceService`] as
//! `POST /api/balance`.

pub mod connection;
pub mod handler;
pub mod messages;

pub use connection::ConnectionOptions;
