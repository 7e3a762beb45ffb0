//! API response models

use crate::health::HealthStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Gateway liveness response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    /// RFC 3339 timestamp of the check
    pub timestamp: String,
}

/// Aggregate fleet health report
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ServicesStatusResponse {
    /// The gateway's own status; always "healthy" if it can answer at all.
    pub gateway: String,
    pub services: HashMap<String, HealthStatus>,
    pub timestamp: String,
}

/// Static gateway metadata
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    /// Registered route prefixes, one per backend service.
    pub services: Vec<String>,
}
