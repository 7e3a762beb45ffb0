//! HTTP route definitions

use crate::api::handlers;
use crate::api::models::{HealthResponse, RootResponse, ServicesStatusResponse};
use crate::config::CorsConfig;
use crate::health::{HealthState, HealthStatus};
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// OpenAPI documentation for the gateway's own endpoints. Forwarded routes
/// are documented by the backends that own them.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AIHub API Gateway",
        description = "Routes requests to AIHub backend services and reports fleet health.",
        license(name = "MIT"),
    ),
    paths(
        handlers::health_check,
        handlers::services_status,
        handlers::root,
    ),
    components(schemas(
        HealthResponse,
        ServicesStatusResponse,
        RootResponse,
        HealthStatus,
        HealthState,
    )),
    tags(
        (name = "Health", description = "Gateway and fleet health"),
        (name = "Meta", description = "Gateway metadata"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the main application router.
///
/// The three metadata endpoints are matched first; everything else falls
/// through to the prefix router and is forwarded upstream.
pub fn create_router(state: Arc<crate::AppState>) -> Router {
    let cors = cors_layer(&state.settings.cors);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/services/status", get(handlers::services_status))
        .route("/", get(handlers::root))
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(handlers::gateway_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
