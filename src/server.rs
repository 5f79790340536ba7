use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::{demo, load, metrics};
use crate::middleware::timing;
use crate::AppState;

/// Builds the full Axum `Router` with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let recorder = state.recorder.clone();

    Router::new()
        // ── Demo lookups ────────────────────────────────────────
        .route("/api/aircraft/:model", get(demo::get_aircraft))
        .route(
            "/api/compliance/check/:model/:country",
            get(demo::check_compliance),
        )
        // ── Synthetic load control ──────────────────────────────
        .route("/api/load/start", post(load::start_load))
        .route("/api/load/stop", post(load::stop_load))
        .route("/api/load/status", get(load::load_status))
        // ── Metrics query surface ───────────────────────────────
        .route("/api/metrics", get(metrics::get_system_metrics))
        .route("/api/metrics/endpoints", get(metrics::list_endpoints))
        .route("/api/metrics/endpoint", get(metrics::get_endpoint))
        .route("/api/metrics/health", get(metrics::get_health))
        .route("/api/metrics/stream", get(metrics::metrics_stream))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn_with_state(recorder, timing::record_request))
        .layer(CorsLayer::permissive())
}
