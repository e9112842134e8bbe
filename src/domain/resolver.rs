//! Balance resolution capability.
//!
//! [`BalanceResolver`] is the opaque "mobile number in, balance out"
//! operation both transports are built on. The trait returns a boxed future
//! so it can be held as `Arc<dyn BalanceResolver>` and swapped for a
//! deterministic stub in tests.

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use tokio::sync::RwLock;

use super::Balance;
use crate::error::GatewayError;

/// Resolves the balance of the account registered under a mobile number.
///
/// Implementations must be reentrant: the gateway calls `resolve`
/// concurrently from every open connection and every HTTP request.
pub trait BalanceResolver: Send + Sync + std::fmt::Debug {
    /// Looks up the balance for `mobile_number`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AccountNotFound`] for unknown accounts, or a
    /// server-class [`GatewayError`] if the backend fails.
    fn resolve<'a>(&'a self, mobile_number: &'a str) -> BoxFuture<'a, Result<Balance, GatewayError>>;
}

/// Resolver backed by an in-process map.
///
/// Used when persistence is disabled (seeded from `SEED_ACCOUNTS`) and as
/// the default collaborator in tests.
#[derive(Debug, Default)]
pub struct InMemoryBalanceResolver {
    accounts: RwLock<HashMap<String, Balance>>,
}

impl InMemoryBalanceResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver pre-populated with the given accounts.
    #[must_use]
    pub fn with_accounts<I>(accounts: I) -> Self
    where
        I: IntoIterator<Item = (String, Balance)>,
    {
        Self {
            accounts: RwLock::new(accounts.into_iter().collect()),
        }
    }

    /// Inserts or replaces the balance for `mobile_number`.
    pub async fn set_balance(&self, mobile_number: impl Into<String>, balance: Balance) {
        self.accounts
            .write()
            .await
            .insert(mobile_number.into(), balance);
    }

    /// Returns the number of known accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Returns `true` if no accounts are known.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

impl BalanceResolver for InMemoryBalanceResolver {
    fn resolve<'a>(&'a self, mobile_number: &'a str) -> BoxFuture<'a, Result<Balance, GatewayError>> {
        Box::pin(async move {
            self.accounts
                .read()
                .await
                .get(mobile_number)
                .copied()
                .ok_or_else(|| GatewayError::AccountNotFound(mobile_number.to_string()))
        })
    }
}
