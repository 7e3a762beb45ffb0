//! Application settings and configuration management

use crate::error::{GatewayError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
    pub upstream: UpstreamConfig,
    #[serde(default = "default_services")]
    pub services: Vec<ServiceConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Cross-origin configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    let frontend =
        std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let mut origins = vec![
        frontend,
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
    ];
    origins.dedup();
    origins
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Timeouts applied to outbound calls
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Per-call timeout when forwarding a request to a backend.
    #[serde(default = "default_forward_timeout")]
    pub forward_timeout_secs: u64,
    /// Per-probe timeout for `/health` checks.
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

fn default_forward_timeout() -> u64 {
    30
}

fn default_health_timeout() -> u64 {
    5
}

/// One registered backend service
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Unique service name, used in logs and health reports.
    pub name: String,
    /// Route prefix the service is mounted under, e.g. "/auth".
    pub prefix: String,
    /// Base URL of the service.
    pub url: String,
}

fn service_url(env_key: &str, default: &str) -> String {
    std::env::var(env_key).unwrap_or_else(|_| default.to_string())
}

fn service(name: &str, prefix: &str, env_key: &str, default_url: &str) -> ServiceConfig {
    ServiceConfig {
        name: name.to_string(),
        prefix: prefix.to_string(),
        url: service_url(env_key, default_url),
    }
}

/// The default fleet, one entry per deployed backend. URLs come from the
/// conventional `*_SERVICE_URL` environment variables the deployment sets.
fn default_services() -> Vec<ServiceConfig> {
    vec![
        service("auth-service", "/auth", "AUTH_SERVICE_URL", "http://auth-service:8001"),
        service("spam-service", "/spam", "SPAM_SERVICE_URL", "http://spam-service:8002"),
        service("whatsapp-service", "/whatsapp", "WHATSAPP_SERVICE_URL", "http://whatsapp-service:8003"),
        service("movie-service", "/movie", "MOVIE_SERVICE_URL", "http://movie-service:8004"),
        service("resume-service", "/resume", "RESUME_SERVICE_URL", "http://resume-service:8005"),
        service("house-service", "/house", "HOUSE_SERVICE_URL", "http://house-service:8006"),
        service("fraud-service", "/fraud", "FRAUD_SERVICE_URL", "http://fraud-service:8007"),
        service("code-review-service", "/code-review", "CODE_REVIEW_SERVICE_URL", "http://code-review-service:8008"),
        service("logging-service", "/logging", "LOGGING_SERVICE_URL", "http://logging-service:8009"),
        service("search-service", "/search", "SEARCH_SERVICE_URL", "http://search-service:8010"),
        service("model-mgmt-service", "/models", "MODEL_MGMT_SERVICE_URL", "http://model-mgmt-service:8011"),
    ]
}

impl Settings {
    /// Load settings from the default configuration file and environment.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/gateway.yaml")
    }

    /// Load settings from a specific configuration file path.
    ///
    /// The file is optional; defaults and `GATEWAY__`-prefixed environment
    /// variables apply either way.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let format = if path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml") {
            FileFormat::Yaml
        } else {
            FileFormat::Toml
        };

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("cors.allowed_origins", default_allowed_origins())?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("upstream.forward_timeout_secs", 30)?
            .set_default("upstream.health_timeout_secs", 5)?;

        if path.exists() {
            builder = builder.add_source(File::from(path).format(format));
        }

        builder = builder.add_source(
            Environment::with_prefix("GATEWAY")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration, failing fast on anything the router
    /// could not resolve deterministically at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(config_error("Server port cannot be 0"));
        }
        if self.upstream.forward_timeout_secs == 0 || self.upstream.health_timeout_secs == 0 {
            return Err(config_error("Upstream timeouts must be non-zero"));
        }

        let mut prefixes = HashSet::new();
        for svc in &self.services {
            if svc.name.is_empty() {
                return Err(config_error("Service name cannot be empty"));
            }
            if svc.url.is_empty() {
                return Err(config_error(&format!(
                    "Service '{}' must have a URL",
                    svc.name
                )));
            }
            let prefix = svc.prefix.trim_start_matches('/');
            if prefix.is_empty() {
                return Err(config_error(&format!(
                    "Service '{}' must have a non-empty route prefix",
                    svc.name
                )));
            }
            if !prefixes.insert(prefix.to_string()) {
                return Err(config_error(&format!(
                    "Duplicate route prefix '/{}'",
                    prefix
                )));
            }
        }

        Ok(())
    }
}

fn config_error(msg: &str) -> GatewayError {
    GatewayError::Config(config::ConfigError::Message(msg.to_string()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            cors: CorsConfig {
                allowed_origins: default_allowed_origins(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
            upstream: UpstreamConfig {
                forward_timeout_secs: default_forward_timeout(),
                health_timeout_secs: default_health_timeout(),
            },
            services: default_services(),
        }
    }
}
