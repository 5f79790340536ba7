//! Service configuration.
//!
//! Loaded once at startup from an optional TOML file; every section has
//! defaults, so an empty file (or none at all) is a valid configuration.
//! Nothing is reloaded at runtime.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, TelemetryError};
use crate::metrics::registry::DEFAULT_HISTORY_CAPACITY;
use crate::metrics::HealthThresholds;

/// Query routes that would otherwise inflate their own numbers. Matching
/// ignores trailing slashes.
pub const DEFAULT_EXCLUDED_PATHS: &[&str] = &[
    "/api/metrics",
    "/api/metrics/endpoints",
    "/api/metrics/endpoint",
    "/api/metrics/health",
    "/api/metrics/stream",
];

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Engine settings, fixed for the lifetime of the registry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Response-time samples kept per endpoint.
    pub history_capacity: usize,

    /// Exact paths (raw or route template) that are never recorded.
    pub excluded_paths: Vec<String>,

    pub health: HealthThresholds,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            excluded_paths: DEFAULT_EXCLUDED_PATHS.iter().map(|p| p.to_string()).collect(),
            health: HealthThresholds::default(),
        }
    }
}

impl TelemetryConfig {
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.history_capacity == 0 {
            return Err(TelemetryError::ZeroCapacity);
        }
        self.health.validate()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Defaults when `path` is `None`, otherwise the parsed file. Validated
    /// either way.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::parse(&raw, path)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), TelemetryError> {
        self.telemetry.validate()
    }
}
