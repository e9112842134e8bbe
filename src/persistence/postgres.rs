//! PostgreSQL implementation of [`BalanceResolver`].

use std::time::Duration;

use futures_util::future::BoxFuture;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::GatewayConfig;
use crate::domain::{Balance, BalanceResolver};
use crate::error::GatewayError;

/// Query used to look up a single account balance.
const BALANCE_QUERY: &str =
    "SELECT balance::DOUBLE PRECISION FROM accounts WHERE mobile_number = $1";

/// Opens a connection pool using the database settings in `config`.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the initial connection cannot be
/// established within the configured timeout.
pub async fn connect(config: &GatewayConfig) -> Result<PgPool, GatewayError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// PostgreSQL-backed resolver using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresBalanceResolver {
    pool: PgPool,
}

impl PostgresBalanceResolver {
    /// Creates a new resolver over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the balance row for `mobile_number`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AccountNotFound`] if no row matches,
    /// [`GatewayError::ResolverUnavailable`] on pool timeout or I/O
    /// failure, and [`GatewayError::PersistenceError`] otherwise.
    pub async fn fetch_balance(&self, mobile_number: &str) -> Result<Balance, GatewayError> {
        let row = sqlx::query_scalar::<_, f64>(BALANCE_QUERY)
            .bind(mobile_number)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Balance::new)
            .ok_or_else(|| GatewayError::AccountNotFound(mobile_number.to_string()))
    }
}

impl BalanceResolver for PostgresBalanceResolver {
    fn resolve<'a>(&'a self, mobile_number: &'a str) -> BoxFuture<'a, Result<Balance, GatewayError>> {
        Box::pin(self.fetch_balance(mobile_number))
    }
}
