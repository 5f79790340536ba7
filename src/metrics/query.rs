//! Derived statistics over registry snapshots.
//!
//! Everything here works on copies taken by [`MetricsRegistry`], so the
//! sorting and summing never holds a lock. Missing or empty data yields
//! zeros: "no traffic yet" is a normal answer, not an error.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::percentiles::LatencySummary;
use super::registry::{EndpointSnapshot, MetricsRegistry, RegistrySnapshot};
use super::EndpointKey;

/// Per-endpoint view returned by the query surface.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointMetrics {
    pub method: String,
    pub path: String,
    pub request_count: u64,
    pub error_count: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub error_rate: f64,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub p50_response_time: f64,
    pub p95_response_time: f64,
    pub p99_response_time: f64,
    /// Samples currently retained in the bounded history.
    pub sample_count: usize,
    pub status_codes: BTreeMap<u16, u64>,
    pub last_seen: Option<DateTime<Utc>>,
}

/// System-wide view across every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SystemMetrics {
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: f64,
    pub uptime_human: String,
    pub total_requests: u64,
    pub total_errors: u64,
    pub overall_error_rate: f64,
    /// Mean of all retained samples. Endpoints that evicted history only
    /// contribute their most recent window, so this is not a lifetime mean.
    pub avg_response_time: f64,
    pub requests_per_minute: f64,
    pub last_observation: Option<DateTime<Utc>>,
    pub active_endpoints: usize,
}

impl EndpointMetrics {
    pub fn from_snapshot(snapshot: EndpointSnapshot) -> Self {
        let latency = LatencySummary::from_samples(snapshot.samples);
        Self {
            method: snapshot.key.method,
            path: snapshot.key.path,
            request_count: snapshot.request_count,
            error_count: snapshot.error_count,
            client_errors: snapshot.client_errors,
            server_errors: snapshot.server_errors,
            error_rate: ratio(snapshot.error_count, snapshot.request_count),
            avg_response_time: latency.avg,
            min_response_time: latency.min,
            max_response_time: latency.max,
            p50_response_time: latency.p50,
            p95_response_time: latency.p95,
            p99_response_time: latency.p99,
            sample_count: latency.count,
            status_codes: snapshot.status_codes,
            last_seen: snapshot.last_seen,
        }
    }
}

impl SystemMetrics {
    pub fn from_snapshot(snapshot: &RegistrySnapshot) -> Self {
        let mut total_requests = 0u64;
        let mut total_errors = 0u64;
        let mut sample_sum = 0.0f64;
        let mut sample_count = 0usize;
        let mut active_endpoints = 0usize;
        let mut last_observation: Option<DateTime<Utc>> = None;

        for endpoint in &snapshot.endpoints {
            total_requests += endpoint.request_count;
            total_errors += endpoint.error_count;
            sample_sum += endpoint.samples.iter().sum::<f64>();
            sample_count += endpoint.samples.len();
            if endpoint.request_count > 0 {
                active_endpoints += 1;
            }
            last_observation = last_observation.max(endpoint.last_seen);
        }

        let uptime_seconds = snapshot.uptime.as_secs_f64();
        let requests_per_minute = if uptime_seconds > 0.0 {
            total_requests as f64 / (uptime_seconds / 60.0)
        } else {
            0.0
        };

        Self {
            started_at: snapshot.started_at,
            uptime_seconds,
            uptime_human: format_uptime(snapshot.uptime.as_secs()),
            total_requests,
            total_errors,
            overall_error_rate: ratio(total_errors, total_requests),
            avg_response_time: if sample_count > 0 {
                sample_sum / sample_count as f64
            } else {
                0.0
            },
            requests_per_minute,
            last_observation,
            active_endpoints,
        }
    }
}

impl MetricsRegistry {
    /// Statistics for one endpoint; zeros if it was never recorded.
    pub fn endpoint_metrics(&self, key: &EndpointKey) -> EndpointMetrics {
        let snapshot = self
            .snapshot(key)
            .unwrap_or_else(|| EndpointSnapshot::unseen(key.clone()));
        EndpointMetrics::from_snapshot(snapshot)
    }

    /// Statistics for every endpoint, ordered by path then method.
    pub fn all_endpoint_metrics(&self) -> Vec<EndpointMetrics> {
        let mut endpoints = self.snapshot_all().endpoints;
        endpoints.sort_by(|a, b| {
            (&a.key.path, &a.key.method).cmp(&(&b.key.path, &b.key.method))
        });
        endpoints
            .into_iter()
            .map(EndpointMetrics::from_snapshot)
            .collect()
    }

    pub fn system_metrics(&self) -> SystemMetrics {
        SystemMetrics::from_snapshot(&self.snapshot_all())
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// `HH:MM:SS`, prefixed with `Nd ` once the uptime passes a day.
pub fn format_uptime(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}
