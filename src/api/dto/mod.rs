//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names follow the camelCase wire format shared with the WebSocket
//! protocol (`mobileNumber`, `balance`).

pub mod balance_dto;

pub use balance_dto::*;
