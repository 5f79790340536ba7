//! Request-latency telemetry.
//!
//! Records one observation per completed request (method, route template,
//! elapsed seconds, status code) and answers per-endpoint and system-wide
//! performance queries plus a thresholded health verdict.
//!
//! ```text
//!   request ──▶ middleware::timing ──▶ handler
//!                     │ (key, secs, status)
//!                     ▼
//!             metrics::MetricsRegistry ◀── metrics::query / metrics::health
//!                                                  ▲
//!                                     handlers::metrics (HTTP surface)
//! ```
//!
//! The engine (`metrics`, `middleware::recorder`) has no HTTP dependency;
//! `server` and `handlers` host it behind axum.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod load_generator;
pub mod metrics;
pub mod middleware;
pub mod server;

pub use config::Config;
pub use error::{ConfigError, TelemetryError};
pub use metrics::{EndpointKey, HealthThresholds, MetricsRegistry, Observation};
pub use middleware::RequestRecorder;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// The single registry for this process; also reachable through `recorder`.
    pub metrics: Arc<MetricsRegistry>,

    /// Interceptor core used by the timing middleware.
    pub recorder: RequestRecorder,

    /// Thresholds applied by the health route.
    pub health: HealthThresholds,

    /// Flag checked by every synthetic-load worker on each iteration.
    pub load_running: Arc<AtomicBool>,

    /// Handle to the spawned load driver so we can await clean shutdown.
    pub load_handle: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl AppState {
    pub fn new(config: &config::TelemetryConfig) -> Result<Self, TelemetryError> {
        config.validate()?;
        let metrics = Arc::new(MetricsRegistry::new(config.history_capacity)?);
        let recorder = RequestRecorder::new(metrics.clone(), config.excluded_paths.iter().cloned());

        Ok(Self {
            metrics,
            recorder,
            health: config.health,
            load_running: Arc::new(AtomicBool::new(false)),
            load_handle: tokio::sync::Mutex::new(None),
        })
    }
}
