//! Balance service: validation and resolver delegation.

use std::sync::Arc;

use crate::domain::{Balance, BalanceResolver};
use crate::error::GatewayError;

/// Entry point for balance lookups from any transport.
///
/// Stateless coordinator around a shared [`BalanceResolver`].
#[derive(Debug, Clone)]
pub struct BalanceService {
    resolver: Arc<dyn BalanceResolver>,
}

impl BalanceService {
    /// Creates a new `BalanceService` over the given resolver.
    #[must_use]
    pub fn new(resolver: Arc<dyn BalanceResolver>) -> Self {
        Self { resolver }
    }

    /// Resolves the balance for `mobile_number`.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the number is blank, and
    /// propagates any resolver failure unchanged.
    pub async fn check_balance(&self, mobile_number: &str) -> Result<Balance, GatewayError> {
        let mobile_number = mobile_number.trim();
        if mobile_number.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "mobileNumber must not be empty".to_string(),
            ));
        }

        match self.resolver.resolve(mobile_number).await {
            Ok(balance) => {
                tracing::debug!(mobile_number, %balance, "balance resolved");
                Ok(balance)
            }
            Err(err) => {
                tracing::warn!(mobile_number, error = %err, "balance resolution failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InMemoryBalanceResolver;

    fn make_service() -> BalanceService {
        let resolver = InMemoryBalanceResolver::with_accounts([
            ("9999999999".to_string(), Balance::new(42.0)),
            ("0711000111".to_string(), Balance::new(10.5)),
        ]);
        BalanceService::new(Arc::new(resolver))
    }

    #[tokio::test]
    async fn known_account_resolves() {
        let service = make_service();
        let balance = tokio_test::assert_ok!(service.check_balance("9999999999").await);
        assert_eq!(balance, Balance::new(42.0));
    }

    #[tokio::test]
    async fn whitespace_is_trimmed() {
        let service = make_service();
        let balance = tokio_test::assert_ok!(service.check_balance("  0711000111 ").await);
        assert_eq!(balance, Balance::new(10.5));
    }

    #[tokio::test]
    async fn blank_number_is_invalid() {
        let service = make_service();
        let err = tokio_test::assert_err!(service.check_balance("   ").await);
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn unknown_account_propagates() {
        let service = make_service();
        let err = tokio_test::assert_err!(service.check_balance("unknown").await);
        assert!(matches!(err, GatewayError::AccountNotFound(_)));
    }
}
