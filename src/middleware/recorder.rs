use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::metrics::{EndpointKey, MetricsRegistry, Observation};

/// Path recorded for requests that matched no route, so arbitrary URIs
/// cannot grow the registry.
pub const UNMATCHED_PATH: &str = "<unmatched>";

/// Feeds completed requests into a [`MetricsRegistry`], skipping
/// excluded paths. Framework-agnostic; the axum layer in
/// [`timing`](super::timing) is a thin wrapper around it.
///
/// Cheap to clone, every clone shares the same registry.
#[derive(Clone)]
pub struct RequestRecorder {
    registry: Arc<MetricsRegistry>,
    excluded: Arc<HashSet<String>>,
}

/// A started request. Consume it with [`complete`](Self::complete) once the
/// final status is known; dropping it records nothing.
#[must_use = "an in-flight request is only recorded once completed"]
pub struct InFlight {
    registry: Arc<MetricsRegistry>,
    key: EndpointKey,
    started: Instant,
}

impl RequestRecorder {
    pub fn new<I, S>(registry: Arc<MetricsRegistry>, excluded_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            registry,
            excluded: Arc::new(excluded_paths.into_iter().map(Into::into).collect()),
        }
    }

    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    /// Exact match, ignoring trailing slashes (`/api/metrics/` matches
    /// `/api/metrics`).
    pub fn is_excluded(&self, path: &str) -> bool {
        if self.excluded.contains(path) {
            return true;
        }
        let trimmed = path.trim_end_matches('/');
        !trimmed.is_empty() && trimmed != path && self.excluded.contains(trimmed)
    }

    /// Start timing a request. Returns `None` when either the raw path or
    /// the route template is excluded. The template is the key; requests
    /// without one share [`UNMATCHED_PATH`].
    pub fn begin(&self, method: &str, raw_path: &str, template: Option<&str>) -> Option<InFlight> {
        if self.is_excluded(raw_path) || template.is_some_and(|t| self.is_excluded(t)) {
            return None;
        }
        Some(InFlight {
            registry: self.registry.clone(),
            key: EndpointKey::new(method, template.unwrap_or(UNMATCHED_PATH)),
            started: Instant::now(),
        })
    }
}

impl InFlight {
    pub fn key(&self) -> &EndpointKey {
        &self.key
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Record the request with its final status and return the elapsed time.
    pub fn complete(self, status_code: u16) -> Duration {
        let elapsed = self.started.elapsed();
        self.registry.record(Observation::new(
            self.key,
            elapsed.as_secs_f64(),
            status_code,
        ));
        elapsed
    }
}

/// Header value for the per-response timing field, e.g. `0.0123s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.4}s", elapsed.as_secs_f64())
}
