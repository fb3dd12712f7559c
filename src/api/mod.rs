use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::constants::REQUEST_TIMEOUT_SECS;
use crate::core::services::CareLinkService;

pub mod extract;
pub mod handlers;
pub mod models;
pub mod openapi;

/// Full application router: health check, `/api`, swagger UI and the HTTP layers.
pub fn build_router(service: Arc<CareLinkService>) -> Router {
    Router::new()
        .route("/", get(|| async { "OK" }))
        .nest("/api", handlers::api_routes(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http()) // Request tracing
}
