//! Gateway error taxonomy and HTTP conversion

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors the gateway can surface to a caller.
///
/// Failures originating from a specific backend call are converted into one
/// of these at the forwarder boundary; a per-request failure never crashes
/// the process.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No registered route prefix matches the inbound path.
    #[error("Service not found")]
    RouteNotFound,

    /// The inbound method is not one of the five the gateway forwards.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The upstream service did not respond within the forwarding timeout.
    #[error("{service} timeout - service did not respond within {timeout_secs} seconds")]
    UpstreamTimeout { service: String, timeout_secs: u64 },

    /// A connection to the upstream service could not be established.
    #[error("{service} unavailable - cannot connect to {url}. Ensure the service is running.")]
    UpstreamUnavailable { service: String, url: String },

    /// Any other failure while forwarding to the upstream service.
    #[error("Internal gateway error while connecting to {service}")]
    Internal { service: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl GatewayError {
    /// The HTTP status the error is surfaced as.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Internal { .. } | GatewayError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        // Raw error details are logged at the point of failure, never
        // returned to the caller.
        let body = json!({ "detail": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}
