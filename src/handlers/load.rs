use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

use crate::load_generator::{self, LoadPlan};
use crate::AppState;

use super::AppError;

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LoadRequest {
    /// Number of concurrent Tokio tasks simulating requests
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// How long the run lasts (seconds)
    #[serde(default = "default_duration")]
    pub duration_secs: u64,

    /// Percentage of simulated requests that fail (0–100)
    #[serde(default = "default_error_pct")]
    pub error_pct: u8,
}

fn default_concurrency() -> u32 {
    10
}
fn default_duration() -> u64 {
    30
}
fn default_error_pct() -> u8 {
    2
}

#[derive(Debug, Serialize)]
pub struct LoadStatus {
    pub running: bool,
    pub message: String,
}

impl LoadRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.concurrency == 0 || self.concurrency > 500 {
            return Err(AppError::BadRequest(
                "concurrency must be between 1 and 500".into(),
            ));
        }
        if self.duration_secs == 0 || self.duration_secs > 300 {
            return Err(AppError::BadRequest(
                "duration_secs must be between 1 and 300".into(),
            ));
        }
        if self.error_pct > 100 {
            return Err(AppError::BadRequest(
                "error_pct must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

// ─── POST /api/load/start ────────────────────────────────────────

pub async fn start_load(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoadRequest>,
) -> Result<Json<LoadStatus>, AppError> {
    req.validate()?;

    // Holding the handle lock across the flag flip and the spawn keeps
    // start and stop from interleaving.
    let mut guard = state.load_handle.lock().await;

    // Guard: only one run at a time
    if state
        .load_running
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(AppError::AlreadyRunning);
    }

    let msg = format!(
        "Started: {} workers × {}s, {}% errors",
        req.concurrency, req.duration_secs, req.error_pct,
    );
    info!(
        concurrency = req.concurrency,
        duration_secs = req.duration_secs,
        error_pct = req.error_pct,
        "synthetic load started"
    );

    let plan = LoadPlan {
        concurrency: req.concurrency,
        duration_secs: req.duration_secs,
        error_pct: req.error_pct,
    };
    let running = state.load_running.clone();
    let metrics = state.metrics.clone();

    // Stash the handle so `stop` can await clean shutdown
    *guard = Some(tokio::spawn(async move {
        load_generator::run(running, metrics, plan).await;
    }));
    drop(guard);

    Ok(Json(LoadStatus {
        running: true,
        message: msg,
    }))
}

// ─── POST /api/load/stop ─────────────────────────────────────────

pub async fn stop_load(State(state): State<Arc<AppState>>) -> Json<LoadStatus> {
    let mut guard = state.load_handle.lock().await;

    // A run that hit its deadline clears the flag itself but leaves its
    // finished handle behind.
    let was_running = state.load_running.swap(false, Ordering::SeqCst);
    if let Some(handle) = guard.take() {
        // Ignore JoinError: the task may have already finished
        let _ = handle.await;
    }
    drop(guard);

    if !was_running {
        return Json(LoadStatus {
            running: false,
            message: "No synthetic load is running".into(),
        });
    }
    info!("synthetic load stopped");

    Json(LoadStatus {
        running: false,
        message: "Synthetic load stopped".into(),
    })
}

// ─── GET /api/load/status ────────────────────────────────────────

pub async fn load_status(State(state): State<Arc<AppState>>) -> Json<LoadStatus> {
    let running = state.load_running.load(Ordering::SeqCst);
    Json(LoadStatus {
        running,
        message: if running {
            "Synthetic load in progress".into()
        } else {
            "Idle".into()
        },
    })
}
