use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use super::history::BoundedHistory;
use super::{EndpointKey, Observation, StatusClass};
use crate::error::TelemetryError;

// ─── Configuration ───────────────────────────────────────────────

/// Samples kept per endpoint when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe store of per-endpoint request statistics.
///
/// The interceptor calls [`record`](Self::record), the query layer works on
/// [`snapshot_all`](Self::snapshot_all) copies. Shared through an `Arc`;
/// there is no process-wide instance.
///
/// Locking: the endpoint map sits behind an `RwLock`, each record behind its
/// own `Mutex`. Recording into a known key only takes the map's read lock, so
/// writers to different endpoints do not contend. A brand-new key takes the
/// write lock and goes through `entry()`, which makes creation happen once.
pub struct MetricsRegistry {
    capacity: NonZeroUsize,
    inner: RwLock<Inner>,
}

/// Read-only copy of one endpoint's state.
#[derive(Debug, Clone)]
pub struct EndpointSnapshot {
    pub key: EndpointKey,
    pub request_count: u64,
    pub error_count: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub status_codes: BTreeMap<u16, u64>,
    /// History contents in arrival order.
    pub samples: Vec<f64>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl EndpointSnapshot {
    /// Zero-valued view for a key that was never recorded.
    pub fn unseen(key: EndpointKey) -> Self {
        Self {
            key,
            request_count: 0,
            error_count: 0,
            client_errors: 0,
            server_errors: 0,
            status_codes: BTreeMap::new(),
            samples: Vec::new(),
            last_seen: None,
        }
    }
}

/// Read-only copy of the whole registry.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    pub started_at: DateTime<Utc>,
    /// Time since `started_at`, measured when the snapshot was taken.
    pub uptime: Duration,
    pub endpoints: Vec<EndpointSnapshot>,
}

// ─── Internal state ──────────────────────────────────────────────

struct Inner {
    // Monotonic anchor for uptime, wall-clock copy for display
    started: Instant,
    started_at: DateTime<Utc>,
    endpoints: HashMap<EndpointKey, Mutex<EndpointRecord>>,
}

struct EndpointRecord {
    request_count: u64,
    error_count: u64,
    client_errors: u64,
    server_errors: u64,
    status_codes: BTreeMap<u16, u64>,
    history: BoundedHistory,
    last_seen: Option<DateTime<Utc>>,
}

// ─── MetricsRegistry impl ────────────────────────────────────────

impl MetricsRegistry {
    /// Fails on a zero capacity rather than recording nothing at runtime.
    pub fn new(history_capacity: usize) -> Result<Self, TelemetryError> {
        let capacity = NonZeroUsize::new(history_capacity).ok_or(TelemetryError::ZeroCapacity)?;
        Ok(Self {
            capacity,
            inner: RwLock::new(Inner::new()),
        })
    }

    pub fn history_capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Fold one completed request into its endpoint's record.
    pub fn record(&self, observation: Observation) {
        let class = StatusClass::from_status(observation.status_code);
        let now = Utc::now();

        {
            let inner = self.inner.read();
            if let Some(record) = inner.endpoints.get(&observation.key) {
                record
                    .lock()
                    .apply(observation.duration, observation.status_code, class, now);
                return;
            }
        }

        // First sighting of this key (or a racing one): create under the write lock
        let capacity = self.capacity;
        let mut inner = self.inner.write();
        inner
            .endpoints
            .entry(observation.key)
            .or_insert_with(|| Mutex::new(EndpointRecord::new(capacity)))
            .get_mut()
            .apply(observation.duration, observation.status_code, class, now);
    }

    /// Per-request entry point for the dispatch layer.
    pub fn observe(&self, method: &str, path_template: &str, elapsed_seconds: f64, status_code: u16) {
        self.record(Observation::new(
            EndpointKey::new(method, path_template),
            elapsed_seconds,
            status_code,
        ));
    }

    /// Copy of a single endpoint, `None` if it was never recorded.
    pub fn snapshot(&self, key: &EndpointKey) -> Option<EndpointSnapshot> {
        let inner = self.inner.read();
        inner
            .endpoints
            .get(key)
            .map(|record| record.lock().snapshot(key.clone()))
    }

    /// Copy of every endpoint plus the uptime at the time of the call.
    pub fn snapshot_all(&self) -> RegistrySnapshot {
        let inner = self.inner.read();
        let endpoints = inner
            .endpoints
            .iter()
            .map(|(key, record)| record.lock().snapshot(key.clone()))
            .collect();

        RegistrySnapshot {
            started_at: inner.started_at,
            uptime: inner.started.elapsed(),
            endpoints,
        }
    }

    /// Drop every record and restart the uptime clock.
    /// Meant for test harnesses isolating measurement windows.
    pub fn reset(&self) {
        *self.inner.write() = Inner::new();
    }

    pub fn endpoint_count(&self) -> usize {
        self.inner.read().endpoints.len()
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

impl Inner {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
            endpoints: HashMap::new(),
        }
    }
}

impl EndpointRecord {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            request_count: 0,
            error_count: 0,
            client_errors: 0,
            server_errors: 0,
            status_codes: BTreeMap::new(),
            history: BoundedHistory::new(capacity),
            last_seen: None,
        }
    }

    /// Counters and history move together under the record's lock.
    fn apply(&mut self, duration: f64, status_code: u16, class: StatusClass, now: DateTime<Utc>) {
        self.request_count += 1;
        match class {
            StatusClass::Success => {}
            StatusClass::ClientError => {
                self.error_count += 1;
                self.client_errors += 1;
            }
            StatusClass::ServerError => {
                self.error_count += 1;
                self.server_errors += 1;
            }
        }
        *self.status_codes.entry(status_code).or_insert(0) += 1;
        self.history.push(duration);
        self.last_seen = Some(now);
    }

    fn snapshot(&self, key: EndpointKey) -> EndpointSnapshot {
        EndpointSnapshot {
            key,
            request_count: self.request_count,
            error_count: self.error_count,
            client_errors: self.client_errors,
            server_errors: self.server_errors,
            status_codes: self.status_codes.clone(),
            samples: self.history.snapshot(),
            last_seen: self.last_seen,
        }
    }
}
