use std::panic::{self, AssertUnwindSafe};

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;
use tracing::{debug, error};

use super::recorder::{format_elapsed, RequestRecorder};

/// Response header carrying the handler wall time, e.g. `0.0123s`.
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Axum middleware that times every non-excluded request, records it in the
/// registry and stamps `X-Process-Time` on the response.
///
/// The key is the matched route template (`/api/aircraft/:model`); requests
/// that matched no route share [`UNMATCHED_PATH`](super::UNMATCHED_PATH).
/// A panicking handler is recorded as a 500 and the panic is resumed untouched.
///
/// Mount with `axum::middleware::from_fn_with_state(recorder, record_request)`.
pub async fn record_request(
    State(recorder): State<RequestRecorder>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let template = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned());

    let Some(in_flight) = recorder.begin(method.as_str(), &path, template.as_deref()) else {
        return next.run(req).await;
    };

    let mut response = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let elapsed = in_flight.complete(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
            error!(%method, %path, elapsed = %format_elapsed(elapsed), "handler panicked");
            panic::resume_unwind(payload);
        }
    };

    let status = response.status().as_u16();
    let elapsed = in_flight.complete(status);
    let formatted = format_elapsed(elapsed);

    // ── Inject response header ──────────────────────────────────
    if let Ok(val) = HeaderValue::from_str(&formatted) {
        response.headers_mut().insert(PROCESS_TIME_HEADER, val);
    }

    debug!(%method, %path, status, elapsed = %formatted, "request recorded");

    response
}
