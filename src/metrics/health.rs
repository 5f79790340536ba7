use serde::{Deserialize, Serialize};

use super::query::SystemMetrics;
use crate::error::TelemetryError;

/// Upper bounds a healthy service stays within. Both are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    pub max_error_rate: f64,
    /// Seconds.
    pub max_avg_response_time: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            max_error_rate: 0.05,
            max_avg_response_time: 1.0,
        }
    }
}

impl HealthThresholds {
    pub fn validate(&self) -> Result<(), TelemetryError> {
        check_threshold("max_error_rate", self.max_error_rate)?;
        check_threshold("max_avg_response_time", self.max_avg_response_time)
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), TelemetryError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TelemetryError::InvalidThreshold { name, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthVerdict {
    Healthy,
    Degraded,
}

/// Verdict plus everything needed to see why it was reached.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthVerdict,
    pub error_rate: f64,
    pub avg_response_time: f64,
    pub total_requests: u64,
    pub thresholds: HealthThresholds,
    /// Names of the thresholds that were exceeded.
    pub breaches: Vec<&'static str>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthVerdict::Healthy
    }
}

/// Pure: same metrics and thresholds, same report.
pub fn evaluate(metrics: &SystemMetrics, thresholds: &HealthThresholds) -> HealthReport {
    let mut breaches = Vec::new();
    if metrics.overall_error_rate > thresholds.max_error_rate {
        breaches.push("max_error_rate");
    }
    if metrics.avg_response_time > thresholds.max_avg_response_time {
        breaches.push("max_avg_response_time");
    }

    HealthReport {
        status: if breaches.is_empty() {
            HealthVerdict::Healthy
        } else {
            HealthVerdict::Degraded
        },
        error_rate: metrics.overall_error_rate,
        avg_response_time: metrics.avg_response_time,
        total_requests: metrics.total_requests,
        thresholds: *thresholds,
        breaches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsRegistry;

    fn metrics(error_rate: f64, avg: f64) -> SystemMetrics {
        let mut m = MetricsRegistry::new(1).unwrap().system_metrics();
        m.overall_error_rate = error_rate;
        m.avg_response_time = avg;
        m
    }

    #[test]
    fn no_traffic_is_healthy() {
        let registry = MetricsRegistry::new(4).unwrap();
        let report = evaluate(&registry.system_metrics(), &HealthThresholds::default());
        assert!(report.is_healthy());
        assert!(report.breaches.is_empty());
    }

    #[test]
    fn thresholds_are_inclusive() {
        let t = HealthThresholds::default();
        assert!(evaluate(&metrics(0.05, 1.0), &t).is_healthy());
    }

    #[test]
    fn error_rate_breach_degrades() {
        let report = evaluate(&metrics(0.051, 0.1), &HealthThresholds::default());
        assert_eq!(report.status, HealthVerdict::Degraded);
        assert_eq!(report.breaches, vec!["max_error_rate"]);
    }

    #[test]
    fn slow_responses_degrade() {
        let report = evaluate(&metrics(0.0, 1.5), &HealthThresholds::default());
        assert_eq!(report.status, HealthVerdict::Degraded);
        assert_eq!(report.breaches, vec!["max_avg_response_time"]);
        assert_eq!(report.avg_response_time, 1.5);
    }

    #[test]
    fn reports_both_breaches() {
        let t = HealthThresholds {
            max_error_rate: 0.0,
            max_avg_response_time: 0.0,
        };
        let report = evaluate(&metrics(0.5, 0.5), &t);
        assert_eq!(report.breaches.len(), 2);
        assert_eq!(report.thresholds, t);
    }

    #[test]
    fn rejects_bad_thresholds() {
        let bad = HealthThresholds {
            max_error_rate: -0.1,
            ..HealthThresholds::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(TelemetryError::InvalidThreshold { name: "max_error_rate", .. })
        ));

        let nan = HealthThresholds {
            max_avg_response_time: f64::NAN,
            ..HealthThresholds::default()
        };
        assert!(nan.validate().is_err());
        assert!(HealthThresholds::default().validate().is_ok());
    }

    #[test]
    fn serializes_verdict_lowercase() {
        let json = serde_json::to_value(HealthVerdict::Degraded).unwrap();
        assert_eq!(json, serde_json::json!("degraded"));
    }
}
