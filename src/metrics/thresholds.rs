use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::types::RunSummary;

/// Pass/fail criteria applied to a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Thresholds {
    /// Minimum fraction of passing checks, 0.0 to 1.0
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_check_pass_rate: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_p95_latency_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdBreach {
    #[error("check pass rate {actual:.4} is below required {required:.4}")]
    CheckPassRate { actual: f64, required: f64 },

    #[error("p95 latency {actual_ms:.2} ms exceeds limit {limit_ms:.2} ms")]
    P95Latency { actual_ms: f64, limit_ms: f64 },
}

impl Thresholds {
    /// A run that performed no checks has a pass rate of zero.
    pub fn evaluate(&self, summary: &RunSummary) -> Vec<ThresholdBreach> {
        let mut breaches = Vec::new();

        if let Some(required) = self.min_check_pass_rate {
            let actual = summary.metrics.checks.pass_rate();
            if actual < required {
                breaches.push(ThresholdBreach::CheckPassRate { actual, required });
            }
        }

        if let Some(limit_ms) = self.max_p95_latency_ms {
            let actual_ms = summary.latency.p95;
            if summary.latency.count > 0 && actual_ms > limit_ms {
                breaches.push(ThresholdBreach::P95Latency { actual_ms, limit_ms });
            }
        }

        breaches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::types::{CheckSummary, LatencyStats, MetricsSnapshot};
    use chrono::Utc;
    use uuid::Uuid;

    fn summary(passes: u64, fails: u64, p95: f64) -> RunSummary {
        RunSummary {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            elapsed_secs: 1.0,
            vus: 1,
            interrupted_iterations: 0,
            cancelled: false,
            metrics: MetricsSnapshot {
                iterations: passes + fails,
                checks: CheckSummary {
                    name: "check".into(),
                    passes,
                    fails,
                },
                ..Default::default()
            },
            latency: LatencyStats {
                p95,
                count: passes + fails,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_no_thresholds_never_breach() {
        let thresholds = Thresholds::default();
        assert!(thresholds.evaluate(&summary(0, 10, 9_999.0)).is_empty());
    }

    #[test]
    fn test_pass_rate_breach() {
        let thresholds = Thresholds {
            min_check_pass_rate: Some(0.95),
            ..Default::default()
        };
        assert!(thresholds.evaluate(&summary(99, 1, 1.0)).is_empty());

        let breaches = thresholds.evaluate(&summary(90, 10, 1.0));
        assert_eq!(
            breaches,
            vec![ThresholdBreach::CheckPassRate {
                actual: 0.9,
                required: 0.95
            }]
        );
    }

    #[test]
    fn test_empty_run_breaches_pass_rate() {
        let thresholds = Thresholds {
            min_check_pass_rate: Some(0.5),
            ..Default::default()
        };
        assert_eq!(thresholds.evaluate(&summary(0, 0, 0.0)).len(), 1);
    }

    #[test]
    fn test_latency_breach() {
        let thresholds = Thresholds {
            max_p95_latency_ms: Some(200.0),
            ..Default::default()
        };
        assert!(thresholds.evaluate(&summary(10, 0, 150.0)).is_empty());
        assert!(matches!(
            thresholds.evaluate(&summary(10, 0, 250.0)).as_slice(),
            [ThresholdBreach::P95Latency { .. }]
        ));
    }

    #[test]
    fn test_validation_rejects_bad_rate() {
        let thresholds = Thresholds {
            min_check_pass_rate: Some(1.5),
            ..Default::default()
        };
        assert!(thresholds.validate().is_err());
    }
}
