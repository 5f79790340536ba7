//! End-to-end scenarios over the query and health surfaces.

use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use latency_telemetry::load_generator::SYNTHETIC_PREFIX;
use latency_telemetry::metrics::health::{self, HealthVerdict};
use latency_telemetry::{EndpointKey, HealthThresholds, MetricsRegistry};

mod common;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn three_requests_one_client_error() {
    let registry = MetricsRegistry::new(1000).unwrap();
    registry.observe("GET", "/x", 0.10, 200);
    registry.observe("GET", "/x", 0.20, 200);
    registry.observe("GET", "/x", 0.30, 422);

    let m = registry.endpoint_metrics(&EndpointKey::new("GET", "/x"));
    assert_eq!(m.request_count, 3);
    assert_eq!(m.error_count, 1);
    assert!((m.error_rate - 0.333).abs() < 0.001);
    assert!(approx(m.avg_response_time, 0.20));
    assert_eq!(m.min_response_time, 0.10);
    assert_eq!(m.max_response_time, 0.30);
    assert_eq!(m.status_codes, BTreeMap::from([(200, 2), (422, 1)]));
}

#[test]
fn error_rate_at_threshold_is_healthy() {
    let registry = MetricsRegistry::new(1000).unwrap();
    for _ in 0..19 {
        registry.observe("GET", "/ok", 0.05, 200);
    }
    registry.observe("GET", "/ok", 0.05, 500);

    let system = registry.system_metrics();
    assert!(approx(system.overall_error_rate, 0.05));
    assert!(approx(system.avg_response_time, 0.05));

    let thresholds = HealthThresholds {
        max_error_rate: 0.05,
        max_avg_response_time: 1.0,
    };
    let report = health::evaluate(&system, &thresholds);
    assert_eq!(report.status, HealthVerdict::Healthy);

    registry.observe("GET", "/ok", 0.05, 500);
    let report = health::evaluate(&registry.system_metrics(), &thresholds);
    assert_eq!(report.status, HealthVerdict::Degraded);
}

#[test]
fn history_keeps_the_last_capacity_values() {
    let capacity = 100;
    let registry = MetricsRegistry::new(capacity).unwrap();
    for i in 0..(capacity + 37) {
        registry.observe("GET", "/h", i as f64, 200);
    }

    let snap = registry.snapshot(&EndpointKey::new("GET", "/h")).unwrap();
    let expected: Vec<f64> = (37..capacity + 37).map(|i| i as f64).collect();
    assert_eq!(snap.samples, expected);
    assert_eq!(snap.request_count, (capacity + 37) as u64);
}

#[test]
fn p99_never_below_median() {
    let registry = MetricsRegistry::new(500).unwrap();
    for i in 0..500u32 {
        let secs = f64::from((i * 37) % 101) / 100.0;
        registry.observe("GET", "/spread", secs, 200);
    }
    let m = registry.endpoint_metrics(&EndpointKey::new("GET", "/spread"));
    assert!(m.p99_response_time >= m.p95_response_time);
    assert!(m.p99_response_time >= m.p50_response_time);
}

#[test]
fn reset_isolates_measurement_windows() {
    let registry = MetricsRegistry::new(10).unwrap();
    registry.observe("GET", "/stale", 0.1, 500);
    registry.reset();
    registry.observe("GET", "/fresh", 0.1, 200);

    let system = registry.system_metrics();
    assert_eq!(system.total_requests, 1);
    assert_eq!(system.total_errors, 0);
    assert_eq!(system.active_endpoints, 1);
    assert_eq!(
        registry
            .endpoint_metrics(&EndpointKey::new("GET", "/stale"))
            .request_count,
        0
    );
}

#[tokio::test]
async fn health_route_switches_to_503() {
    let state = common::state();
    let app = common::router(&state);

    let res = common::get(&app, "/api/metrics/health").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = common::body_json(res).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["thresholds"]["max_error_rate"], 0.05);

    for _ in 0..9 {
        state.metrics.observe("GET", "/x", 0.01, 200);
    }
    state.metrics.observe("GET", "/x", 0.01, 503);

    let res = common::get(&app, "/api/metrics/health").await;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = common::body_json(res).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["breaches"], json!(["max_error_rate"]));
    assert_eq!(body["total_requests"], 10);
}

#[tokio::test]
async fn query_routes_serve_snapshots() {
    let state = common::state();
    let app = common::router(&state);

    common::get(&app, "/api/aircraft/A320").await;
    common::get(&app, "/api/aircraft/nope").await;
    common::get(&app, "/api/compliance/check/B737/US").await;

    let system = common::body_json(common::get(&app, "/api/metrics").await).await;
    assert_eq!(system["total_requests"], 3);
    assert_eq!(system["total_errors"], 1);
    assert_eq!(system["active_endpoints"], 2);
    assert!(system["uptime_human"].is_string());
    assert!(system["last_observation"].is_string());

    let one = common::body_json(
        common::get(&app, "/api/metrics/endpoint?method=get&path=/api/aircraft/:model").await,
    )
    .await;
    assert_eq!(one["method"], "GET");
    assert_eq!(one["request_count"], 2);
    assert_eq!(one["error_count"], 1);
    assert_eq!(one["status_codes"]["404"], 1);

    let unseen =
        common::body_json(common::get(&app, "/api/metrics/endpoint?path=/never").await).await;
    assert_eq!(unseen["request_count"], 0);
    assert_eq!(unseen["error_rate"], 0.0);
    assert_eq!(unseen["p99_response_time"], 0.0);

    let all = common::body_json(common::get(&app, "/api/metrics/endpoints").await).await;
    let paths: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(
        paths,
        vec!["/api/aircraft/:model", "/api/compliance/check/:model/:country"]
    );
}

#[tokio::test]
async fn load_routes_validate_and_report() {
    let state = common::state();
    let app = common::router(&state);

    let res = common::post_json(&app, "/api/load/start", json!({ "concurrency": 0 })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = common::post_json(&app, "/api/load/start", json!({ "error_pct": 101 })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let status = common::body_json(common::get(&app, "/api/load/status").await).await;
    assert_eq!(status["running"], false);

    let res = common::post_json(
        &app,
        "/api/load/start",
        json!({ "concurrency": 2, "duration_secs": 30, "error_pct": 0 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = common::post_json(&app, "/api/load/start", json!({})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let stopped = common::body_json(common::post_json(&app, "/api/load/stop", json!({})).await).await;
    assert_eq!(stopped["running"], false);
}

#[tokio::test]
async fn synthetic_load_leaves_served_routes_alone() {
    let state = common::state();
    let app = common::router(&state);

    let res = common::post_json(
        &app,
        "/api/load/start",
        json!({ "concurrency": 4, "duration_secs": 1, "error_pct": 100 }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = common::get(&app, "/api/aircraft/A320").await;
    assert_eq!(res.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(300)).await;
    common::post_json(&app, "/api/load/stop", json!({})).await;

    let aircraft = state
        .metrics
        .endpoint_metrics(&EndpointKey::new("GET", "/api/aircraft/:model"));
    assert_eq!(aircraft.request_count, 1);
    assert_eq!(aircraft.error_count, 0);
    assert!(state
        .metrics
        .snapshot(&EndpointKey::new("GET", "/api/compliance/check/:model/:country"))
        .is_none());

    let synthetic: Vec<_> = state
        .metrics
        .all_endpoint_metrics()
        .into_iter()
        .filter(|m| m.path.starts_with(SYNTHETIC_PREFIX))
        .collect();
    assert!(!synthetic.is_empty());
    assert!(synthetic.iter().all(|m| m.error_count == m.request_count));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_start_and_stop_never_strand_a_run() {
    let state = common::state();
    let app = common::router(&state);
    let body = json!({ "concurrency": 2, "duration_secs": 60, "error_pct": 0 });

    for _ in 0..20 {
        let (started, _) = tokio::join!(
            common::post_json(&app, "/api/load/start", body.clone()),
            common::post_json(&app, "/api/load/stop", json!({})),
        );
        assert_eq!(started.status(), StatusCode::OK);

        // Whichever ran second, a final stop must find and reap the run.
        let stopped =
            common::body_json(common::post_json(&app, "/api/load/stop", json!({})).await).await;
        assert_eq!(stopped["running"], false);
        assert!(!state.load_running.load(Ordering::SeqCst));
        assert!(state.load_handle.lock().await.is_none());
    }
}
