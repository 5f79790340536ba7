use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::metrics::MetricsRegistry;

// ─── Constants ───────────────────────────────────────────────────

/// Prefix of every key the simulated traffic is recorded under. Served
/// routes never start with it, so a run leaves their records untouched.
pub const SYNTHETIC_PREFIX: &str = "/synthetic";

/// Keys the simulated traffic is attributed to, mirroring the demo routes.
pub const SYNTHETIC_ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/synthetic/aircraft/:model"),
    ("GET", "/synthetic/compliance/check/:model/:country"),
];

/// Status codes drawn for failed simulated requests.
const ERROR_STATUSES: &[u16] = &[404, 422, 500, 503];

/// Simulated handler latency range (ms).
const LATENCY_MS: std::ops::RangeInclusive<u64> = 2..=40;

#[derive(Debug, Clone, Copy)]
pub struct LoadPlan {
    pub concurrency: u32,
    pub duration_secs: u64,
    pub error_pct: u8,
}

// ─── Public entry point ──────────────────────────────────────────

/// Spawns `plan.concurrency` Tokio tasks that feed simulated requests into
/// the registry until the deadline or the `running` flag is set to false.
pub async fn run(running: Arc<AtomicBool>, metrics: Arc<MetricsRegistry>, plan: LoadPlan) {
    let deadline = Instant::now() + Duration::from_secs(plan.duration_secs);

    let mut handles = Vec::with_capacity(plan.concurrency as usize);

    for worker_id in 0..plan.concurrency {
        let running = running.clone();
        let metrics = metrics.clone();

        handles.push(tokio::spawn(async move {
            worker(worker_id, running, metrics, deadline, plan.error_pct).await;
        }));
    }

    for h in handles {
        let _ = h.await;
    }

    running.store(false, Ordering::SeqCst);
}

// ─── Worker loop ─────────────────────────────────────────────────

async fn worker(
    id: u32,
    running: Arc<AtomicBool>,
    metrics: Arc<MetricsRegistry>,
    deadline: Instant,
    error_pct: u8,
) {
    // Each worker gets its own deterministic RNG seeded uniquely.
    let mut rng = StdRng::seed_from_u64(1000 + id as u64);

    while running.load(Ordering::Relaxed) && Instant::now() < deadline {
        let (method, path) = SYNTHETIC_ENDPOINTS[rng.gen_range(0..SYNTHETIC_ENDPOINTS.len())];
        let status = pick_status(&mut rng, error_pct);
        let latency = Duration::from_millis(rng.gen_range(LATENCY_MS));

        let t0 = Instant::now();
        tokio::time::sleep(latency).await;
        metrics.observe(method, path, t0.elapsed().as_secs_f64(), status);
    }
}

fn pick_status(rng: &mut StdRng, error_pct: u8) -> u16 {
    if rng.gen_range(0u8..100) < error_pct {
        ERROR_STATUSES[rng.gen_range(0..ERROR_STATUSES.len())]
    } else {
        200
    }
}
