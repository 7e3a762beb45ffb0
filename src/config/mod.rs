//! Configuration management

pub mod settings;

pub use settings::{
    CorsConfig, LoggingConfig, ServerConfig, ServiceConfig, Settings, UpstreamConfig,
};
