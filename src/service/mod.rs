//! Service layer: the single balance lookup shared by every transport.
//!
//! [`BalanceService`] validates the account identifier and delegates to the
//! injected [`super::domain::BalanceResolver`]. The HTTP endpoint and the
//! WebSocket bridge both call it, so an account resolves identically on
//! either path.

pub mod balance_service;

pub use balance_service::BalanceService;
