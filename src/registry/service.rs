//! Static registry of backend services

use crate::config::ServiceConfig;
use std::sync::Arc;

/// One backend service the gateway fronts.
///
/// Immutable after startup; the name is unique and used for logging and
/// health reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub base_url: String,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
        }
    }

    /// URL of the service's health endpoint.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url.trim_end_matches('/'))
    }
}

/// Read-only registry of all backend services, built once at startup and
/// shared across tasks without locking.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: Vec<Arc<ServiceDescriptor>>,
}

impl ServiceRegistry {
    pub fn new(services: Vec<ServiceDescriptor>) -> Self {
        Self {
            services: services.into_iter().map(Arc::new).collect(),
        }
    }

    /// Build the registry from configuration, in registration order.
    pub fn from_config(configs: &[ServiceConfig]) -> Self {
        Self::new(
            configs
                .iter()
                .map(|c| ServiceDescriptor::new(c.name.clone(), c.url.clone()))
                .collect(),
        )
    }

    pub fn services(&self) -> &[Arc<ServiceDescriptor>] {
        &self.services
    }

    pub fn get(&self, name: &str) -> Option<Arc<ServiceDescriptor>> {
        self.services.iter().find(|s| s.name == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
