//! Main entry point for the AIHub Gateway

use aihub_gateway::{
    api,
    config::Settings,
    health::HealthAggregator,
    proxy::Forwarder,
    registry::{RoutingTable, ServiceRegistry},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    info!("Starting AIHub Gateway");
    info!(
        "Loaded configuration: server={}:{}, services={}",
        settings.server.host,
        settings.server.port,
        settings.services.len()
    );

    // Build the registry and routing table once; both are read-only from
    // here on and shared across request tasks without locking.
    let registry = Arc::new(ServiceRegistry::from_config(&settings.services));
    let routes = RoutingTable::from_config(&settings.services, &registry);

    for svc in registry.services() {
        info!(service = %svc.name, url = %svc.base_url, "Registered service");
    }

    // One pooled outbound client shared by the forwarder and health probes;
    // timeouts are applied per call.
    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(32)
        .build()?;

    let forwarder = Forwarder::new(
        client.clone(),
        Duration::from_secs(settings.upstream.forward_timeout_secs),
    );
    let health = HealthAggregator::new(
        client,
        registry,
        Duration::from_secs(settings.upstream.health_timeout_secs),
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);

    let state = Arc::new(AppState {
        settings,
        routes,
        forwarder,
        health,
    });

    let app = api::routes::create_router(state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
