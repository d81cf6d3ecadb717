//! Progress logging, end-of-run report and JSON export

use super::collector::MetricsCollector;
use super::thresholds::ThresholdBreach;
use super::types::RunSummary;
use crate::error::Result;
use std::path::Path;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Log a progress line every `every` until `stop` is cancelled
pub async fn start_periodic_reporter(
    collector: MetricsCollector,
    every: Duration,
    stop: CancellationToken,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                let snapshot = collector.snapshot();
                let elapsed = collector.elapsed().as_secs_f64();
                let rate = if elapsed > 0.0 {
                    snapshot.iterations as f64 / elapsed
                } else {
                    0.0
                };
                info!(
                    elapsed_secs = %format!("{elapsed:.1}"),
                    iterations = snapshot.iterations,
                    checks_passed = snapshot.checks.passes,
                    checks_failed = snapshot.checks.fails,
                    rate_per_sec = %format!("{rate:.2}"),
                    "progress"
                );
            }
        }
    }
}

/// Warn about response patterns that point at a misconfigured target
pub fn warn_on_suspicious_results(summary: &RunSummary, author_id: &str) {
    let not_found = summary.requests_with_error_code("NOT_FOUND");
    if not_found > 0 {
        warn!(
            author_id,
            not_found,
            "target answered NOT_FOUND; the author is probably not seeded in the PR service"
        );
    }
    if summary.metrics.iterations > 0
        && summary.requests_with_status(409) == summary.metrics.iterations
    {
        warn!("every request returned 409; ids from a previous run may still be present");
    }
}

/// Print the final summary to stdout
pub fn print_final_report(summary: &RunSummary, breaches: &[ThresholdBreach]) {
    let metrics = &summary.metrics;
    let latency = &summary.latency;

    println!("\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              PR Service Load Test - Final Report               ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    println!("\n  Run ID:               {}", summary.run_id);
    println!("  Virtual users:        {:>10}", summary.vus);
    println!("  Duration:             {:>10.2} s", summary.elapsed_secs);
    if summary.cancelled {
        println!("  Stopped early:               yes");
    }

    println!("\n  ITERATIONS");
    println!("   Completed:           {:>10}", metrics.iterations);
    println!("   Interrupted:         {:>10}", summary.interrupted_iterations);
    println!(
        "   Throughput:          {:>10.2} req/sec",
        summary.throughput_per_sec()
    );

    let checks = &metrics.checks;
    let mark = if checks.fails == 0 { "✓" } else { "✗" };
    println!("\n  CHECKS");
    println!(
        "   {} {:<28} {:>6.2}%  ✓ {}  ✗ {}",
        mark,
        checks.name,
        checks.pass_rate() * 100.0,
        checks.passes,
        checks.fails
    );

    if !metrics.status_codes.is_empty() {
        println!("\n  STATUS CODES");
        for (status, count) in &metrics.status_codes {
            println!("   {:<20} {:>10}", status, count);
        }
    }

    if !metrics.error_codes.is_empty() {
        println!("\n  SERVICE ERROR CODES");
        for (code, count) in &metrics.error_codes {
            println!("   {:<20} {:>10}", code, count);
        }
    }

    if !metrics.transport_errors.is_empty() {
        println!("\n  TRANSPORT ERRORS");
        for (kind, count) in &metrics.transport_errors {
            println!("   {:<20} {:>10}", kind, count);
        }
    }

    if latency.count > 0 {
        println!("\n  REQUEST LATENCY");
        println!("   Min:                 {:>10.2} ms", latency.min);
        println!("   P50 (Median):        {:>10.2} ms", latency.p50);
        println!("   P90:                 {:>10.2} ms", latency.p90);
        println!("   P95:                 {:>10.2} ms", latency.p95);
        println!("   P99:                 {:>10.2} ms", latency.p99);
        println!("   Max:                 {:>10.2} ms", latency.max);
        println!("   Mean:                {:>10.2} ms", latency.mean);
    }

    if !breaches.is_empty() {
        println!("\n  THRESHOLDS BREACHED");
        for breach in breaches {
            println!("   ✗ {breach}");
        }
    }

    println!("════════════════════════════════════════════════════════════════\n");
}

/// Write the summary as pretty-printed JSON
pub async fn export_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(summary)?;
    tokio::fs::write(path, json).await?;
    info!(path = %path.display(), "summary exported");
    Ok(())
}
