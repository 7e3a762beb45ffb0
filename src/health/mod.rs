//! Fleet health probing

pub mod aggregator;

pub use aggregator::{HealthAggregator, HealthState, HealthStatus};
