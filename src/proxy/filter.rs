//! Hop-by-hop header filtering
//!
//! Connection-specific headers must not be blindly relayed across the proxy
//! boundary in either direction; the gateway's own HTTP layer recomputes
//! them.

use axum::http::HeaderMap;

/// Request headers dropped before forwarding upstream. Content encoding is
/// negotiated per hop: the outbound client advertises its own
/// `accept-encoding` and decompresses before the body is relayed.
const REQUEST_DROP: [&str; 4] = ["host", "content-length", "connection", "accept-encoding"];

/// Response headers dropped before relaying back to the caller.
const RESPONSE_DROP: [&str; 6] = [
    "content-length",
    "content-encoding",
    "transfer-encoding",
    "connection",
    "server",
    "date",
];

/// Strip connection-specific headers from an outbound request.
pub fn filter_request_headers(headers: &HeaderMap) -> HeaderMap {
    filter(headers, &REQUEST_DROP)
}

/// Strip connection-specific headers from an upstream response.
pub fn filter_response_headers(headers: &HeaderMap) -> HeaderMap {
    filter(headers, &RESPONSE_DROP)
}

fn filter(headers: &HeaderMap, drop: &[&str]) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    // HeaderName is already lowercase; iteration yields one entry per value
    // so multi-valued headers survive intact.
    for (name, value) in headers.iter() {
        if !drop.contains(&name.as_str()) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}
