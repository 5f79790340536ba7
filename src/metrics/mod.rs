pub mod health;
pub mod history;
pub mod percentiles;
pub mod query;
pub mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use health::{HealthReport, HealthThresholds, HealthVerdict};
pub use history::BoundedHistory;
pub use query::{EndpointMetrics, SystemMetrics};
pub use registry::{EndpointSnapshot, MetricsRegistry, RegistrySnapshot};

/// Status codes at or above this value count as errors.
pub const ERROR_STATUS_THRESHOLD: u16 = 400;

/// Identifies one tracked operation, e.g. `GET /api/aircraft/:model`.
///
/// The path is taken as given: callers are expected to pass the route
/// template, not the concrete URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointKey {
    pub method: String,
    pub path: String,
}

impl EndpointKey {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Outcome class of a completed request, decided once at record time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Success,
    ClientError,
    ServerError,
}

impl StatusClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            s if s < ERROR_STATUS_THRESHOLD => Self::Success,
            400..=499 => Self::ClientError,
            _ => Self::ServerError,
        }
    }

    pub fn is_error(self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// A single completed request, as handed to the registry.
/// The interceptor builds one per request; it is never stored verbatim.
#[derive(Debug, Clone)]
pub struct Observation {
    pub key: EndpointKey,
    /// Elapsed wall time in seconds. Not validated.
    pub duration: f64,
    pub status_code: u16,
}

impl Observation {
    pub fn new(key: EndpointKey, duration: f64, status_code: u16) -> Self {
        Self {
            key,
            duration,
            status_code,
        }
    }
}
