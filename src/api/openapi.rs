//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use crate::api::dto::{BalanceQuery, BalanceResponse};
use crate::api::handlers::system::HealthResponse;
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "balance-gateway",
        description = "Account balance lookups over HTTP. The same lookup is available over the `/ws` WebSocket endpoint via `balanceRequest` messages."
    ),
    paths(
        crate::api::handlers::balance::check_balance,
        crate::api::handlers::system::health_handler,
    ),
    components(schemas(BalanceQuery, BalanceResponse, HealthResponse, ErrorResponse, ErrorBody)),
    tags(
        (name = "Balance", description = "Account balance lookups"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Swagger UI served at `/swagger-ui`, backed by `/api-docs/openapi.json`.
#[cfg(feature = "swagger-ui")]
#[must_use]
pub fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
