//! Configuration module for Switchyard
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SWITCHYARD_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use switchyard::config::SwitchyardConfig;
//!
//! let config = SwitchyardConfig::default();
//! assert_eq!(config.server.port, 8700);
//!
//! let toml = r#"
//! [server]
//! port = 9000
//!
//! [[backends]]
//! id = "edge-video"
//! content_types = ["video/*"]
//! cost_tier = 1
//! "#;
//! let config: SwitchyardConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! assert!(config.validate().is_ok());
//! ```

pub mod backend;
pub mod error;
pub mod insights;
pub mod logging;
pub mod routing;
pub mod server;
pub mod streaming;

pub use backend::BackendConfig;
pub use error::ConfigError;
pub use insights::InsightsConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use routing::RoutingConfig;
pub use server::ServerConfig;
pub use streaming::StreamingConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::registry::Capabilities;

/// Unified configuration for the Switchyard service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SwitchyardConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Selection behaviour and hybrid weights
    pub routing: RoutingConfig,
    /// Metrics stream and health thresholds
    pub streaming: StreamingConfig,
    /// Outcome history used by insights
    pub insights: InsightsConfig,
    /// Static backend definitions
    pub backends: Vec<BackendConfig>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl SwitchyardConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("SWITCHYARD_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("SWITCHYARD_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("SWITCHYARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SWITCHYARD_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(strategy) = std::env::var("SWITCHYARD_STRATEGY") {
            if let Ok(s) = strategy.parse() {
                self.routing.default_strategy = s;
            }
        }

        self
    }

    /// Default deadline for unary operations.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "port must be non-zero",
            ));
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_seconds",
                "must be at least 1",
            ));
        }

        self.routing.validate()?;
        self.streaming.validate()?;
        self.insights.validate()?;

        let mut seen = HashSet::new();
        for (i, backend) in self.backends.iter().enumerate() {
            if backend.id.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("backends[{}].id", i),
                    "id cannot be empty",
                ));
            }
            if !seen.insert(backend.id.as_str()) {
                return Err(ConfigError::validation(
                    format!("backends[{}].id", i),
                    format!("duplicate backend id '{}'", backend.id),
                ));
            }
            if backend.content_types.is_empty() {
                return Err(ConfigError::validation(
                    format!("backends[{}].content_types", i),
                    "at least one content type is required",
                ));
            }
            if let Err(e) = Capabilities::new(backend.content_types.clone(), backend.cost_tier) {
                return Err(ConfigError::validation(
                    format!("backends[{}].content_types", i),
                    e.to_string(),
                ));
            }
        }

        Ok(())
    }
}
