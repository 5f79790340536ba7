use serde::Serialize;

/// Latency breakdown over one history snapshot (seconds).
/// Serialized straight into the per-endpoint JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub count: usize,
}

impl LatencySummary {
    /// Summarise a snapshot. Sorts it in place, so hand over a copy.
    /// Returns zeroed values if the snapshot is empty.
    pub fn from_samples(mut samples: Vec<f64>) -> Self {
        if samples.is_empty() {
            return Self::empty();
        }

        samples.sort_by(f64::total_cmp);
        let sum: f64 = samples.iter().sum();

        Self {
            avg: sum / samples.len() as f64,
            min: samples[0],
            max: samples[samples.len() - 1],
            p50: percentile(&samples, 0.50),
            p95: percentile(&samples, 0.95),
            p99: percentile(&samples, 0.99),
            count: samples.len(),
        }
    }

    /// All-zero placeholder used before any samples are recorded.
    pub fn empty() -> Self {
        Self {
            avg: 0.0,
            min: 0.0,
            max: 0.0,
            p50: 0.0,
            p95: 0.0,
            p99: 0.0,
            count: 0,
        }
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

/// Index-floor order statistic: `sorted[floor(p * len)]`, no interpolation.
///
/// `sorted` must be ascending. Empty input yields 0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p * sorted.len() as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
