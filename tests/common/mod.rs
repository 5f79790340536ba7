//! Shared helpers for the router-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use latency_telemetry::config::TelemetryConfig;
use latency_telemetry::{server, AppState};

/// State with default telemetry settings.
pub fn state() -> Arc<AppState> {
    state_with(TelemetryConfig::default())
}

pub fn state_with(config: TelemetryConfig) -> Arc<AppState> {
    Arc::new(AppState::new(&config).unwrap())
}

pub fn router(state: &Arc<AppState>) -> Router {
    server::create_router(state.clone())
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    let req = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
