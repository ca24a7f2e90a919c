//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted at the root level, matching the operator
//! contract: `/devices/{device_id}/{kind}`, `/broadcast`,
//! `/connections`, `/health`.

pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

#[cfg(feature = "swagger-ui")]
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        handlers::commands::block_device,
        handlers::messaging::broadcast_message,
        handlers::system::health_handler,
        handlers::system::connections_handler,
    ),
    tags(
        (name = "Device Commands", description = "Imperative commands pushed to devices"),
        (name = "Messaging", description = "Direct and broadcast messaging"),
        (name = "Monitoring", description = "Connection introspection"),
        (name = "System", description = "Service health"),
    )
)]
struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new().merge(handlers::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs")
                .url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
    };

    router
}
