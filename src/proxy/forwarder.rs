//! Outbound request forwarding and transport-failure classification

use crate::error::{GatewayError, Result};
use crate::proxy::filter;
use crate::registry::ServiceDescriptor;
use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

/// Body of an inbound request, already classified by content type.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Opaque byte sequence forwarded bit-for-bit; used for form and
    /// multipart payloads so boundaries survive untouched.
    Raw(Bytes),
    /// Parsed JSON payload, re-sent as JSON.
    Json(Value),
    /// No body, or a JSON body that failed to parse.
    None,
}

impl RequestBody {
    /// Classify an inbound body the way the backend expects to receive it.
    ///
    /// Only POST, PUT and PATCH carry bodies. Form and multipart payloads
    /// stay raw; anything else is parsed as JSON, and a parse failure
    /// forwards with no body rather than failing the request.
    pub fn from_request(method: &Method, content_type: &str, bytes: Bytes) -> Self {
        if !matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
            return RequestBody::None;
        }
        if is_form_content_type(content_type) {
            return RequestBody::Raw(bytes);
        }
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => RequestBody::Json(value),
            Err(e) => {
                if !bytes.is_empty() {
                    debug!(error = %e, "Dropping unparseable JSON body before forwarding");
                }
                RequestBody::None
            }
        }
    }
}

/// Whether a content type must be forwarded as opaque bytes.
pub fn is_form_content_type(content_type: &str) -> bool {
    content_type.contains("application/x-www-form-urlencoded")
        || content_type.contains("multipart/form-data")
}

/// Response relayed back to the original caller: upstream status, filtered
/// headers, and the body as structured JSON.
#[derive(Debug)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl IntoResponse for ForwardedResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        for (name, value) in self.headers.iter() {
            if name == &CONTENT_TYPE {
                // The upstream content type wins over the gateway's own.
                response.headers_mut().insert(name.clone(), value.clone());
            } else {
                response.headers_mut().append(name.clone(), value.clone());
            }
        }
        response
    }
}

/// Forwards requests to upstream services over a shared pooled client.
pub struct Forwarder {
    client: Client,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Forward one request to `target` and classify any transport failure.
    #[allow(clippy::too_many_arguments)]
    pub async fn forward(
        &self,
        target: &ServiceDescriptor,
        path: &str,
        method: Method,
        headers: &HeaderMap,
        query: Option<&str>,
        body: RequestBody,
        content_type: &str,
    ) -> Result<ForwardedResponse> {
        let base = target.base_url.trim_end_matches('/');
        let url = match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", base, path, q),
            _ => format!("{}{}", base, path),
        };

        let mut forward_headers = filter::filter_request_headers(headers);

        let mut builder = self.client.request(method, &url).timeout(self.timeout);

        match body {
            RequestBody::Raw(bytes) => {
                // Re-attach the original content type so multipart boundaries
                // can be re-parsed bit-for-bit by the receiving service.
                if !forward_headers.contains_key(CONTENT_TYPE) {
                    if let Ok(value) = HeaderValue::from_str(content_type) {
                        forward_headers.insert(CONTENT_TYPE, value);
                    }
                }
                builder = builder.body(bytes);
            }
            RequestBody::Json(value) => {
                builder = builder.json(&value);
            }
            RequestBody::None => {}
        }

        let response = builder
            .headers(forward_headers)
            .send()
            .await
            .map_err(|e| self.classify(e, target, path))?;

        debug!(
            service = %target.name,
            status = %response.status(),
            path,
            "Forwarded request"
        );

        self.relay(response, target, path).await
    }

    /// Convert the upstream response into the shape relayed to the caller.
    async fn relay(
        &self,
        response: reqwest::Response,
        target: &ServiceDescriptor,
        path: &str,
    ) -> Result<ForwardedResponse> {
        let status = response.status();
        let headers = filter::filter_response_headers(response.headers());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let text = response
            .text()
            .await
            .map_err(|e| self.classify(e, target, path))?;

        let body = if content_type.starts_with("application/json") {
            serde_json::from_str(&text).unwrap_or_else(|_| json!({ "data": text }))
        } else {
            json!({ "data": text })
        };

        Ok(ForwardedResponse {
            status,
            headers,
            body,
        })
    }

    /// Map a transport failure to the gateway error taxonomy, logging the
    /// service, target URL and attempted path before converting.
    fn classify(&self, e: reqwest::Error, target: &ServiceDescriptor, path: &str) -> GatewayError {
        if e.is_timeout() {
            error!(
                service = %target.name,
                url = %target.base_url,
                path,
                "Upstream did not respond within {}s",
                self.timeout.as_secs()
            );
            GatewayError::UpstreamTimeout {
                service: target.name.clone(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else if e.is_connect() {
            error!(
                service = %target.name,
                url = %target.base_url,
                path,
                error = %e,
                "Cannot connect to upstream"
            );
            GatewayError::UpstreamUnavailable {
                service: target.name.clone(),
                url: target.base_url.clone(),
            }
        } else {
            error!(
                service = %target.name,
                url = %target.base_url,
                path,
                error = %e,
                "Unexpected error while forwarding"
            );
            GatewayError::Internal {
                service: target.name.clone(),
            }
        }
    }
}
