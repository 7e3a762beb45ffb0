//! Concurrent health probing of every registered service
//!
//! One probe per service, all running concurrently and joined at a barrier:
//! a slow or failing probe never delays or aborts its siblings, and the
//! aggregate call resolves once the slowest probe does.

use crate::registry::{ServiceDescriptor, ServiceRegistry};
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use utoipa::ToSchema;

/// Outcome of probing one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Timeout,
    Unavailable,
    Error,
}

/// Health report for one service in one check round. Never stored, only
/// returned in the aggregate report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: HealthState,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Probes every registered service's `/health` endpoint concurrently.
pub struct HealthAggregator {
    client: Client,
    registry: Arc<ServiceRegistry>,
    timeout: Duration,
}

impl HealthAggregator {
    pub fn new(client: Client, registry: Arc<ServiceRegistry>, timeout: Duration) -> Self {
        Self {
            client,
            registry,
            timeout,
        }
    }

    /// Probe all services and collect one status per service.
    ///
    /// Probe failures are captured per service and never propagate; total
    /// wall time is bounded by the slowest single probe.
    pub async fn check_all(&self) -> HashMap<String, HealthStatus> {
        let probes = self
            .registry
            .services()
            .iter()
            .map(|svc| self.probe(svc.clone()));

        join_all(probes).await.into_iter().collect()
    }

    async fn probe(&self, svc: Arc<ServiceDescriptor>) -> (String, HealthStatus) {
        let url = svc.base_url.clone();
        let start = Instant::now();

        let status = match self
            .client
            .get(svc.health_url())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(_) => {
                let elapsed = start.elapsed().as_secs_f64();
                debug!(service = %svc.name, elapsed, "Health probe succeeded");
                HealthStatus {
                    status: HealthState::Healthy,
                    url,
                    response_time: Some(elapsed),
                    error: None,
                }
            }
            Err(e) if e.is_timeout() => {
                warn!(service = %svc.name, url = %svc.base_url, "Health probe timed out");
                HealthStatus {
                    status: HealthState::Timeout,
                    url,
                    response_time: None,
                    error: Some(format!(
                        "Service did not respond within {} seconds",
                        self.timeout.as_secs()
                    )),
                }
            }
            Err(e) if e.is_connect() => {
                warn!(service = %svc.name, url = %svc.base_url, "Health probe cannot connect");
                HealthStatus {
                    status: HealthState::Unavailable,
                    url,
                    response_time: None,
                    error: Some(
                        "Cannot connect to service - service may not be running".to_string(),
                    ),
                }
            }
            Err(e) => {
                warn!(service = %svc.name, url = %svc.base_url, error = %e, "Health probe failed");
                HealthStatus {
                    status: HealthState::Error,
                    url,
                    response_time: None,
                    error: Some(e.to_string()),
                }
            }
        };

        (svc.name.clone(), status)
    }
}
