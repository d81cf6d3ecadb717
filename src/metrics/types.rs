//! Metric types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckSummary {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

impl CheckSummary {
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }

    /// Fraction of passing checks; 0.0 when nothing was checked
    pub fn pass_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.passes as f64 / total as f64,
        }
    }
}

/// Request latency distribution, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencyStats {
    pub min: f64,
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
    pub mean: f64,
    pub count: u64,
}

/// Counters accumulated while VUs are running
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Completed iterations; each one issued exactly one request
    pub iterations: u64,
    pub checks: CheckSummary,
    pub status_codes: BTreeMap<u16, u64>,
    pub error_codes: BTreeMap<String, u64>,
    pub transport_errors: BTreeMap<String, u64>,
}

/// Everything known about a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub vus: u32,
    /// Iterations still running when the graceful stop window closed
    pub interrupted_iterations: u64,
    pub cancelled: bool,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
    pub latency: LatencyStats,
}

impl RunSummary {
    pub fn throughput_per_sec(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.metrics.iterations as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }

    pub fn requests_with_status(&self, status: u16) -> u64 {
        self.metrics.status_codes.get(&status).copied().unwrap_or(0)
    }

    pub fn requests_with_error_code(&self, code: &str) -> u64 {
        self.metrics.error_codes.get(code).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_rate() {
        let checks = CheckSummary {
            name: "status is 201 or 409".into(),
            passes: 3,
            fails: 1,
        };
        assert_eq!(checks.total(), 4);
        assert!((checks.pass_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CheckSummary::default().pass_rate(), 0.0);
    }

    #[test]
    fn test_summary_serializes_flat() {
        let mut metrics = MetricsSnapshot {
            iterations: 2,
            ..Default::default()
        };
        metrics.status_codes.insert(201, 1);
        metrics.status_codes.insert(409, 1);

        let summary = RunSummary {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            elapsed_secs: 1.0,
            vus: 1,
            interrupted_iterations: 0,
            cancelled: false,
            metrics,
            latency: LatencyStats::default(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["iterations"], 2);
        assert_eq!(json["status_codes"]["201"], 1);
        assert_eq!(json["status_codes"]["409"], 1);
        assert_eq!(summary.requests_with_status(500), 0);
        assert!((summary.throughput_per_sec() - 2.0).abs() < f64::EPSILON);
    }
}
