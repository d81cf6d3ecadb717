pub mod virtual_user;

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::{HttpTarget, PullRequestTarget};
use crate::config::{Config, LoadConfig};
use crate::domain::{PayloadFactory, StatusCheck};
use crate::error::Result;
use crate::metrics::{reporter, MetricsCollector, RunSummary};

pub use virtual_user::VuReport;
use virtual_user::VirtualUser;

/// Shape of the load: how many VUs, for how long, how fast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub vus: u32,
    pub duration: Duration,
    /// Pause after each iteration
    pub think_time: Duration,
    /// Per-VU iteration cap; the run still ends at `duration`
    pub max_iterations: Option<u64>,
    /// How long in-flight iterations may continue after `duration`
    pub graceful_stop: Duration,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            vus: 50,
            duration: Duration::from_secs(30),
            think_time: Duration::from_millis(100),
            max_iterations: None,
            graceful_stop: Duration::from_secs(30),
        }
    }
}

impl From<&LoadConfig> for RunPlan {
    fn from(cfg: &LoadConfig) -> Self {
        Self {
            vus: cfg.vus,
            duration: Duration::from_secs(cfg.duration_secs),
            think_time: Duration::from_millis(cfg.think_time_ms),
            max_iterations: cfg.max_iterations,
            graceful_stop: Duration::from_secs(cfg.graceful_stop_secs),
        }
    }
}

/// Stand-in for "never" when a plan's duration does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn saturating_add(base: Instant, by: Duration) -> Instant {
    base.checked_add(by)
        .or_else(|| base.checked_add(FAR_FUTURE))
        .unwrap_or(base)
}

pub struct LoadRunner {
    target: Arc<dyn PullRequestTarget>,
    factory: Arc<PayloadFactory>,
    check: StatusCheck,
    plan: RunPlan,
    collector: MetricsCollector,
}

impl LoadRunner {
    pub fn new(
        target: Arc<dyn PullRequestTarget>,
        factory: PayloadFactory,
        plan: RunPlan,
    ) -> Result<Self> {
        let check = StatusCheck::create_pull_request();
        let collector = MetricsCollector::new(check.name())?;
        Ok(Self {
            target,
            factory: Arc::new(factory),
            check,
            plan,
            collector,
        })
    }

    pub fn collector(&self) -> MetricsCollector {
        self.collector.clone()
    }

    /// Drive all virtual users until the duration expires or `cancel` fires.
    ///
    /// Failed checks never stop a VU. Iterations still in flight when the
    /// graceful stop window closes are aborted and counted as interrupted.
    pub async fn run(&self, cancel: CancellationToken) -> RunSummary {
        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = saturating_add(start, self.plan.duration);
        let hard_stop = saturating_add(
            start,
            self.plan.duration.saturating_add(self.plan.graceful_stop),
        );

        info!(
            vus = self.plan.vus,
            duration_secs = self.plan.duration.as_secs_f64(),
            think_time_ms = self.plan.think_time.as_millis() as u64,
            "starting virtual users"
        );

        let mut tasks = JoinSet::new();
        for vu in 1..=self.plan.vus {
            let user = VirtualUser {
                id: vu,
                target: Arc::clone(&self.target),
                factory: Arc::clone(&self.factory),
                check: self.check.clone(),
                collector: self.collector.clone(),
                think_time: self.plan.think_time,
                max_iterations: self.plan.max_iterations,
            };
            tasks.spawn(user.run(deadline, cancel.clone()));
        }

        let mut interrupted = 0u64;
        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok(report)) => {
                        if report.interrupted {
                            interrupted += 1;
                        }
                        debug!(vu = report.vu, iterations = report.iterations, "virtual user finished");
                    }
                    Some(Err(e)) => warn!(error = %e, "virtual user task failed"),
                },
                _ = sleep_until(hard_stop) => {
                    let remaining = tasks.len() as u64;
                    warn!(remaining, "graceful stop expired, aborting in-flight iterations");
                    tasks.abort_all();
                    while tasks.join_next().await.is_some() {}
                    interrupted += remaining;
                    break;
                }
            }
        }

        let summary = RunSummary {
            run_id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            elapsed_secs: start.elapsed().as_secs_f64(),
            vus: self.plan.vus,
            interrupted_iterations: interrupted,
            cancelled: cancel.is_cancelled(),
            metrics: self.collector.snapshot(),
            latency: self.collector.latency_stats(),
        };

        info!(
            run_id = %summary.run_id,
            iterations = summary.metrics.iterations,
            checks_passed = summary.metrics.checks.passes,
            checks_failed = summary.metrics.checks.fails,
            "load test finished"
        );
        summary
    }
}

/// Full run against the configured HTTP target: optional health probe,
/// periodic progress logging, then the load itself.
pub async fn execute(cfg: &Config, cancel: CancellationToken) -> Result<RunSummary> {
    let target = HttpTarget::new(
        cfg.target.base_url.clone(),
        Duration::from_secs(cfg.target.request_timeout_secs),
    )?;

    if cfg.target.health_check {
        target.health().await?;
        info!(base_url = %cfg.target.base_url, "target is healthy");
    }

    let runner = LoadRunner::new(
        Arc::new(target),
        cfg.payload.factory(),
        RunPlan::from(&cfg.load),
    )?;

    let stop_reporter = CancellationToken::new();
    let reporter_task = tokio::spawn(reporter::start_periodic_reporter(
        runner.collector(),
        Duration::from_secs(cfg.report.interval_secs),
        stop_reporter.clone(),
    ));

    let summary = runner.run(cancel).await;

    stop_reporter.cancel();
    if let Err(e) = reporter_task.await {
        warn!(error = %e, "progress reporter stopped abnormally");
    }

    reporter::warn_on_suspicious_results(&summary, &cfg.payload.author_id);
    Ok(summary)
}
