//! AIHub Gateway
//!
//! An API gateway that sits in front of the AIHub backend fleet, routes
//! inbound requests to the right service by path prefix, normalizes
//! cross-service error handling, and reports aggregate fleet health.

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod proxy;
pub mod registry;

pub use error::{GatewayError, Result};

use health::HealthAggregator;
use proxy::Forwarder;
use registry::RoutingTable;

/// Application state shared across all handlers.
///
/// Everything here is read-only after startup, so it is shared across
/// concurrent requests without locking. The service registry itself lives
/// inside the health aggregator, the only component that walks it.
pub struct AppState {
    pub settings: config::Settings,
    pub routes: RoutingTable,
    pub forwarder: Forwarder,
    pub health: HealthAggregator,
}
