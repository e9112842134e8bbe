//! Persistence layer: PostgreSQL-backed balance resolution.
//!
//! The account schema is owned elsewhere; this module only reads the
//! `accounts` table through a shared `sqlx::PgPool`.

pub mod postgres;

pub use postgres::{PostgresBalanceResolver, connect};
