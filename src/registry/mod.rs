//! Service registry and prefix routing

pub mod routing;
pub mod service;

pub use routing::{RouteEntry, RoutingTable};
pub use service::{ServiceDescriptor, ServiceRegistry};
