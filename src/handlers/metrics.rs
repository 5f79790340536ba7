use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::metrics::{health, EndpointKey, EndpointMetrics, HealthReport, SystemMetrics};
use crate::AppState;

/// Tick for the live metrics feed.
const STREAM_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
pub struct EndpointQuery {
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
}

fn default_method() -> String {
    "GET".into()
}

// ─── GET /api/metrics ────────────────────────────────────────────

pub async fn get_system_metrics(State(state): State<Arc<AppState>>) -> Json<SystemMetrics> {
    Json(state.metrics.system_metrics())
}

// ─── GET /api/metrics/endpoints ──────────────────────────────────

pub async fn list_endpoints(State(state): State<Arc<AppState>>) -> Json<Vec<EndpointMetrics>> {
    Json(state.metrics.all_endpoint_metrics())
}

// ─── GET /api/metrics/endpoint?method=GET&path=/x ────────────────
/// Unknown endpoints answer 200 with zeroed statistics.

pub async fn get_endpoint(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EndpointQuery>,
) -> Json<EndpointMetrics> {
    let key = EndpointKey::new(query.method.to_ascii_uppercase(), query.path);
    Json(state.metrics.endpoint_metrics(&key))
}

// ─── GET /api/metrics/health ─────────────────────────────────────
/// 200 when healthy, 503 when degraded; the body is the same report.

pub async fn get_health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let report = health::evaluate(&state.metrics.system_metrics(), &state.health);
    if report.is_healthy() {
        (StatusCode::OK, Json(report))
    } else {
        warn!(
            error_rate = report.error_rate,
            avg_response_time = report.avg_response_time,
            breaches = ?report.breaches,
            "service degraded"
        );
        (StatusCode::SERVICE_UNAVAILABLE, Json(report))
    }
}

// ─── GET /api/metrics/stream ─────────────────────────────────────
/// Server-Sent Events endpoint.
/// Pushes the system snapshot as JSON every 500 ms.

pub async fn metrics_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let interval = tokio::time::interval(STREAM_INTERVAL);

    let stream = IntervalStream::new(interval).map(move |_| {
        let snapshot = state.metrics.system_metrics();
        let json = serde_json::to_string(&snapshot).unwrap_or_default();
        Ok(Event::default().data(json))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
