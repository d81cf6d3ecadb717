//! Metrics collector shared by all virtual users

use super::types::{CheckSummary, LatencyStats, MetricsSnapshot};
use crate::client::RequestOutcome;
use crate::domain::CheckOutcome;
use hdrhistogram::{CreationError, Histogram};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct MetricsCollector {
    metrics: Arc<Mutex<MetricsSnapshot>>,
    /// Microseconds
    latencies: Arc<Mutex<Histogram<u64>>>,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new(check_name: &str) -> Result<Self, CreationError> {
        // 3 significant digits, auto-resizing
        let latencies = Histogram::new(3)?;
        let metrics = MetricsSnapshot {
            checks: CheckSummary {
                name: check_name.to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        Ok(Self {
            metrics: Arc::new(Mutex::new(metrics)),
            latencies: Arc::new(Mutex::new(latencies)),
            start_time: Instant::now(),
        })
    }

    /// Record one finished iteration: its request outcome and check result
    pub fn record_iteration(&self, outcome: &RequestOutcome, check: CheckOutcome) {
        let mut metrics = self.metrics.lock();
        metrics.iterations += 1;
        match check {
            CheckOutcome::Pass => metrics.checks.passes += 1,
            CheckOutcome::Fail => metrics.checks.fails += 1,
        }
        match &outcome.result {
            Ok(response) => {
                *metrics
                    .status_codes
                    .entry(response.status.as_u16())
                    .or_default() += 1;
                if let Some(code) = &response.error_code {
                    *metrics.error_codes.entry(code.to_string()).or_default() += 1;
                }
            }
            Err(e) => {
                *metrics
                    .transport_errors
                    .entry(e.kind().to_string())
                    .or_default() += 1;
            }
        }
        drop(metrics);

        let micros = u64::try_from(outcome.latency.as_micros()).unwrap_or(u64::MAX);
        let _ = self.latencies.lock().record(micros.max(1));
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.lock().clone()
    }

    pub fn latency_stats(&self) -> LatencyStats {
        let hist = self.latencies.lock();
        if hist.is_empty() {
            return LatencyStats::default();
        }
        let ms = |micros: u64| micros as f64 / 1000.0;
        LatencyStats {
            min: ms(hist.min()),
            p50: ms(hist.value_at_quantile(0.50)),
            p90: ms(hist.value_at_quantile(0.90)),
            p95: ms(hist.value_at_quantile(0.95)),
            p99: ms(hist.value_at_quantile(0.99)),
            max: ms(hist.max()),
            mean: hist.mean() / 1000.0,
            count: hist.len(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ResponseSummary;
    use crate::domain::ServiceErrorCode;
    use crate::error::TransportError;
    use reqwest::StatusCode;

    fn response(status: StatusCode, code: Option<ServiceErrorCode>, ms: u64) -> RequestOutcome {
        RequestOutcome {
            latency: Duration::from_millis(ms),
            result: Ok(ResponseSummary {
                status,
                error_code: code,
            }),
        }
    }

    #[test]
    fn test_counts_by_status_and_check() {
        let collector = MetricsCollector::new("status is 201 or 409").unwrap();
        collector.record_iteration(&response(StatusCode::CREATED, None, 10), CheckOutcome::Pass);
        collector.record_iteration(
            &response(StatusCode::CONFLICT, Some(ServiceErrorCode::PrExists), 20),
            CheckOutcome::Pass,
        );
        collector.record_iteration(
            &response(StatusCode::INTERNAL_SERVER_ERROR, None, 30),
            CheckOutcome::Fail,
        );
        collector.record_iteration(
            &RequestOutcome {
                latency: Duration::from_millis(40),
                result: Err(TransportError::Timeout),
            },
            CheckOutcome::Fail,
        );

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.iterations, 4);
        assert_eq!(snapshot.checks.name, "status is 201 or 409");
        assert_eq!(snapshot.checks.passes, 2);
        assert_eq!(snapshot.checks.fails, 2);
        assert_eq!(snapshot.status_codes.get(&201), Some(&1));
        assert_eq!(snapshot.status_codes.get(&409), Some(&1));
        assert_eq!(snapshot.status_codes.get(&500), Some(&1));
        assert_eq!(snapshot.error_codes.get("PR_EXISTS"), Some(&1));
        assert_eq!(snapshot.transport_errors.get("timeout"), Some(&1));
    }

    #[test]
    fn test_latency_stats() {
        let collector = MetricsCollector::new("check").unwrap();
        assert_eq!(collector.latency_stats().count, 0);

        for ms in 1..=100 {
            collector.record_iteration(&response(StatusCode::CREATED, None, ms), CheckOutcome::Pass);
        }

        let stats = collector.latency_stats();
        assert_eq!(stats.count, 100);
        assert!((stats.min - 1.0).abs() < 0.01);
        assert!((stats.max - 100.0).abs() < 0.1);
        assert!((stats.p50 - 50.0).abs() < 0.1);
        assert!(stats.p95 >= stats.p90 && stats.p99 >= stats.p95);
    }

    #[test]
    fn test_clones_share_state() {
        let collector = MetricsCollector::new("check").unwrap();
        let other = collector.clone();
        other.record_iteration(&response(StatusCode::CREATED, None, 5), CheckOutcome::Pass);
        assert_eq!(collector.snapshot().iterations, 1);
    }
}
