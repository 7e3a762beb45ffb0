//! Path-prefix routing table

use crate::config::ServiceConfig;
use crate::registry::{ServiceDescriptor, ServiceRegistry};
use std::sync::Arc;

/// One route: a path prefix mapped to its target service.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// Prefix without the leading slash, compared case-sensitively.
    pub prefix: String,
    pub target: Arc<ServiceDescriptor>,
}

/// Maps a URL path prefix to a target backend.
///
/// Entries are sorted longest-prefix-first at construction, so overlapping
/// prefixes such as `model` and `models` resolve to the more specific route
/// regardless of registration order. Duplicate prefixes are rejected by
/// config validation before the table is built.
#[derive(Debug, Default)]
pub struct RoutingTable {
    routes: Vec<RouteEntry>,
}

impl RoutingTable {
    pub fn new(mut routes: Vec<RouteEntry>) -> Self {
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { routes }
    }

    /// Derive the table from the registry, one route per configured service.
    pub fn from_config(configs: &[ServiceConfig], registry: &ServiceRegistry) -> Self {
        let routes = configs
            .iter()
            .filter_map(|c| {
                registry.get(&c.name).map(|target| RouteEntry {
                    prefix: c.prefix.trim_start_matches('/').to_string(),
                    target,
                })
            })
            .collect();
        Self::new(routes)
    }

    /// Resolve an inbound path to its target service and the remaining path.
    ///
    /// The inbound path and each prefix are compared with the leading slash
    /// removed; the longest matching prefix wins. The returned path is the
    /// remainder with its leading slash stripped and re-rooted, `/` when
    /// nothing remains.
    pub fn resolve(&self, path: &str) -> Option<(Arc<ServiceDescriptor>, String)> {
        let path = path.trim_start_matches('/');
        let entry = self.routes.iter().find(|r| path.starts_with(&r.prefix))?;

        let rest = path[entry.prefix.len()..].trim_start_matches('/');
        let forward_path = if rest.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", rest)
        };

        Some((entry.target.clone(), forward_path))
    }

    /// Registered prefixes in match order, with the leading slash restored.
    pub fn prefixes(&self) -> Vec<String> {
        self.routes.iter().map(|r| format!("/{}", r.prefix)).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
