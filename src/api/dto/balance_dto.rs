//! Balance lookup DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Balance;

/// Request body for `POST /api/balance`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceQuery {
    /// Mobile number identifying the account.
    #[schema(example = "9999999999")]
    pub mobile_number: String,
}

/// Response body for `POST /api/balance`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// Current account balance.
    #[schema(value_type = f64, example = 42)]
    pub balance: Balance,
}
