use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::PullRequestTarget;
use crate::domain::{PayloadFactory, StatusCheck};
use crate::metrics::MetricsCollector;

/// What a virtual user reports when its loop ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VuReport {
    pub vu: u32,
    pub iterations: u64,
    /// The loop was stopped while a request was in flight
    pub interrupted: bool,
}

/// One simulated client repeatedly creating pull requests
pub(crate) struct VirtualUser {
    pub id: u32,
    pub target: Arc<dyn PullRequestTarget>,
    pub factory: Arc<PayloadFactory>,
    pub check: StatusCheck,
    pub collector: MetricsCollector,
    pub think_time: Duration,
    pub max_iterations: Option<u64>,
}

impl VirtualUser {
    pub async fn run(self, deadline: Instant, cancel: CancellationToken) -> VuReport {
        let mut iteration = 0u64;

        loop {
            if cancel.is_cancelled()
                || Instant::now() >= deadline
                || self.max_iterations.is_some_and(|max| iteration >= max)
            {
                break;
            }

            let payload = self.factory.build(self.id, iteration);
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return VuReport { vu: self.id, iterations: iteration, interrupted: true };
                }
                outcome = self.target.create_pull_request(&payload) => outcome,
            };

            let check = self.check.evaluate(outcome.status());
            if !check.is_pass() {
                match &outcome.result {
                    Ok(response) => debug!(
                        vu = self.id,
                        iteration,
                        status = response.status.as_u16(),
                        error_code = ?response.error_code,
                        "check failed"
                    ),
                    Err(e) => debug!(vu = self.id, iteration, error = %e, "request failed"),
                }
            }
            self.collector.record_iteration(&outcome, check);
            iteration += 1;

            tokio::select! {
                _ = sleep(self.think_time) => {}
                _ = sleep_until(deadline) => break,
                _ = cancel.cancelled() => break,
            }
        }

        VuReport {
            vu: self.id,
            iterations: iteration,
            interrupted: false,
        }
    }
}
