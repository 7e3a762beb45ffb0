//! End-to-end forwarding tests against mock backends

use aihub_gateway::api::routes::create_router;
use aihub_gateway::config::{ServiceConfig, Settings};
use aihub_gateway::health::HealthAggregator;
use aihub_gateway::proxy::Forwarder;
use aihub_gateway::registry::{RoutingTable, ServiceRegistry};
use aihub_gateway::AppState;
use serde_json::{json, Value};
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request as MockRequest, ResponseTemplate};

/// Matches a request body byte-for-byte.
struct ExactBody(Vec<u8>);

impl Match for ExactBody {
    fn matches(&self, request: &MockRequest) -> bool {
        request.body == self.0
    }
}

fn service(name: &str, prefix: &str, url: &str) -> ServiceConfig {
    ServiceConfig {
        name: name.to_string(),
        prefix: prefix.to_string(),
        url: url.to_string(),
    }
}

/// Spin up the gateway on an ephemeral port and return its base URL.
async fn spawn_gateway(services: Vec<ServiceConfig>, forward_timeout_secs: u64) -> String {
    let settings = Settings {
        services,
        ..Settings::default()
    };
    settings.validate().unwrap();

    let registry = Arc::new(ServiceRegistry::from_config(&settings.services));
    let routes = RoutingTable::from_config(&settings.services, &registry);
    let client = reqwest::Client::new();
    let forwarder = Forwarder::new(client.clone(), Duration::from_secs(forward_timeout_secs));
    let health = HealthAggregator::new(
        client,
        registry,
        Duration::from_secs(settings.upstream.health_timeout_secs),
    );

    let state = Arc::new(AppState {
        settings,
        routes,
        forwarder,
        health,
    });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A localhost URL with nothing listening on it.
fn unreachable_url() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_get_forwarded_with_query_params() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .and(query_param("genre", "drama"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [1, 2]})))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = spawn_gateway(
        vec![service("movie-service", "/movie", &backend.uri())],
        30,
    )
    .await;

    let resp = reqwest::get(format!("{}/movie/movies?genre=drama", gateway))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"results": [1, 2]}));
}

#[tokio::test]
async fn test_json_post_round_trips_unchanged() {
    let payload = json!({
        "email": "user@example.com",
        "password": "hunter2",
        "nested": {"z": 1, "a": [true, null, 2.5]}
    });

    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "jwt"})))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = spawn_gateway(vec![service("auth-service", "/auth", &backend.uri())], 30).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/auth/login", gateway))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"token": "jwt"}));
}

#[tokio::test]
async fn test_patch_forwards_body() {
    let backend = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/users/42"))
        .and(body_json(json!({"name": "updated"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = spawn_gateway(vec![service("auth-service", "/auth", &backend.uri())], 30).await;

    let resp = reqwest::Client::new()
        .patch(format!("{}/auth/users/42", gateway))
        .json(&json!({"name": "updated"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_multipart_body_forwarded_byte_identical() {
    let boundary = "----GatewayBoundary4aF9c2";
    let content_type = format!("multipart/form-data; boundary={}", boundary);
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"resume.txt\"\r\n\
         Content-Type: text/plain\r\n\r\nten years of experience\r\n--{b}--\r\n",
        b = boundary
    );

    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .and(header("content-type", content_type.as_str()))
        .and(ExactBody(body.clone().into_bytes()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"score": 0.9})))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = spawn_gateway(
        vec![service("resume-service", "/resume", &backend.uri())],
        30,
    )
    .await;

    let resp = reqwest::Client::new()
        .post(format!("{}/resume/match", gateway))
        .header("content-type", &content_type)
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_malformed_json_body_forwarded_without_body() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check"))
        .and(ExactBody(Vec::new()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = spawn_gateway(vec![service("spam-service", "/spam", &backend.uri())], 30).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/spam/check", gateway))
        .header("content-type", "application/json")
        .body("{not valid json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_gzip_upstream_response_relayed_decompressed() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let payload = json!({"ok": true, "items": [1, 2, 3]});
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(payload.to_string().as_bytes())
        .unwrap();
    let gzipped = encoder.finish().unwrap();

    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(gzipped, "application/json")
                .insert_header("content-encoding", "gzip"),
        )
        .mount(&backend)
        .await;

    let gateway = spawn_gateway(
        vec![service("search-service", "/search", &backend.uri())],
        30,
    )
    .await;

    // A compressed upstream body must reach the caller decompressed, with
    // no stale content-encoding claiming otherwise.
    let resp = reqwest::Client::new()
        .get(format!("{}/search/data", gateway))
        .header("accept-encoding", "gzip")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("content-encoding").is_none());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, payload);
}

#[tokio::test]
async fn test_non_json_upstream_body_is_wrapped() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text report"))
        .mount(&backend)
        .await;

    let gateway = spawn_gateway(vec![service("fraud-service", "/fraud", &backend.uri())], 30).await;

    let resp = reqwest::get(format!("{}/fraud/report", gateway)).await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"data": "plain text report"}));
}

#[tokio::test]
async fn test_unknown_prefix_returns_404() {
    let gateway = spawn_gateway(
        vec![service("auth-service", "/auth", "http://127.0.0.1:1")],
        30,
    )
    .await;

    let resp = reqwest::get(format!("{}/billing/invoices", gateway))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Service not found");
}

#[tokio::test]
async fn test_unsupported_method_returns_405() {
    let gateway = spawn_gateway(
        vec![service("auth-service", "/auth", "http://127.0.0.1:1")],
        30,
    )
    .await;

    let resp = reqwest::Client::new()
        .head(format!("{}/auth/login", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);
}

#[tokio::test]
async fn test_unreachable_backend_returns_503() {
    let url = unreachable_url();
    let gateway = spawn_gateway(vec![service("house-service", "/house", &url)], 30).await;

    let resp = reqwest::get(format!("{}/house/predict", gateway))
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);

    let body: Value = resp.json().await.unwrap();
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("house-service"));
    assert!(detail.contains(&url));
}

#[tokio::test]
async fn test_slow_backend_returns_504() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&backend)
        .await;

    // Forwarding timeout shortened to keep the test fast.
    let gateway = spawn_gateway(
        vec![service("logging-service", "/logging", &backend.uri())],
        1,
    )
    .await;

    let resp = reqwest::get(format!("{}/logging/slow", gateway)).await.unwrap();
    assert_eq!(resp.status(), 504);

    let body: Value = resp.json().await.unwrap();
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("logging-service"));
    assert!(detail.contains("1 seconds"));
}

#[tokio::test]
async fn test_upstream_status_and_headers_relayed_filtered() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(418)
                .set_body_json(json!({"detail": "teapot"}))
                .insert_header("server", "upstream-server")
                .insert_header("content-encoding", "identity")
                .insert_header("x-upstream-trace", "abc123"),
        )
        .mount(&backend)
        .await;

    let gateway = spawn_gateway(vec![service("search-service", "/search", &backend.uri())], 30).await;

    let resp = reqwest::get(format!("{}/search/missing", gateway)).await.unwrap();
    assert_eq!(resp.status(), 418);

    // Upstream-only headers survive; proxy-unsafe ones do not.
    assert_eq!(resp.headers().get("x-upstream-trace").unwrap(), "abc123");
    assert!(resp
        .headers()
        .get("server")
        .map_or(true, |v| v != "upstream-server"));
    assert!(resp.headers().get("content-encoding").is_none());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "teapot");
}

#[tokio::test]
async fn test_gateway_own_health_endpoint() {
    // No backends need to be reachable for gateway liveness.
    let gateway = spawn_gateway(
        vec![service("auth-service", "/auth", "http://127.0.0.1:1")],
        30,
    )
    .await;

    let resp = reqwest::get(format!("{}/health", gateway)).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("healthy"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_root_lists_registered_prefixes() {
    let gateway = spawn_gateway(
        vec![
            service("auth-service", "/auth", "http://127.0.0.1:1"),
            service("spam-service", "/spam", "http://127.0.0.1:1"),
        ],
        30,
    )
    .await;

    let resp = reqwest::get(format!("{}/", gateway)).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert!(body["version"].is_string());
    let services: Vec<&str> = body["services"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(services, vec!["/auth", "/spam"]);
}
