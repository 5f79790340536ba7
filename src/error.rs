use std::path::PathBuf;

use thiserror::Error;

/// Misconfiguration of the telemetry engine itself.
///
/// Observations never produce errors; only construction can fail.
#[derive(Debug, Error, PartialEq)]
pub enum TelemetryError {
    #[error("history capacity must be greater than zero")]
    ZeroCapacity,

    #[error("health threshold `{name}` must be a finite, non-negative number (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },
}

/// Failure to load the service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(#[from] TelemetryError),
}
