//! HTTP request handlers

use crate::api::models::{HealthResponse, RootResponse, ServicesStatusResponse};
use crate::error::GatewayError;
use crate::proxy::{ForwardedResponse, RequestBody};
use crate::AppState;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Gateway liveness check. Never probes downstream services.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Gateway is running", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "API Gateway is healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Status of every registered backend service, probed concurrently.
#[utoipa::path(
    get,
    path = "/services/status",
    tag = "Health",
    responses(
        (status = 200, description = "Per-service health report", body = ServicesStatusResponse)
    )
)]
pub async fn services_status(State(state): State<Arc<AppState>>) -> Json<ServicesStatusResponse> {
    let services = state.health.check_all().await;

    Json(ServicesStatusResponse {
        gateway: "healthy".to_string(),
        services,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Static gateway metadata: name, version and registered route prefixes.
#[utoipa::path(
    get,
    path = "/",
    tag = "Meta",
    responses(
        (status = 200, description = "Gateway metadata", body = RootResponse)
    )
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    let services = state
        .settings
        .services
        .iter()
        .map(|s| format!("/{}", s.prefix.trim_start_matches('/')))
        .collect();

    Json(RootResponse {
        message: "AIHub API Gateway".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}

/// Route an inbound request to the matching backend service.
///
/// Resolves the path prefix against the routing table, classifies the body
/// by content type, and relays the upstream response verbatim apart from
/// header filtering.
pub async fn gateway_router(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<ForwardedResponse, GatewayError> {
    let (parts, body) = req.into_parts();

    if !matches!(
        parts.method,
        Method::GET | Method::POST | Method::PUT | Method::DELETE | Method::PATCH
    ) {
        return Err(GatewayError::MethodNotAllowed);
    }

    let path = parts.uri.path().to_string();
    let query = parts.uri.query().map(str::to_string);

    let (target, forward_path) = state
        .routes
        .resolve(&path)
        .ok_or(GatewayError::RouteNotFound)?;

    info!(
        service = %target.name,
        method = %parts.method,
        path = %path,
        "Routing request"
    );

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|_| GatewayError::Internal {
            service: target.name.clone(),
        })?;
    let request_body = RequestBody::from_request(&parts.method, &content_type, bytes);

    state
        .forwarder
        .forward(
            &target,
            &forward_path,
            parts.method,
            &parts.headers,
            query.as_deref(),
            request_body,
            &content_type,
        )
        .await
}
