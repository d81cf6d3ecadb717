pub mod collector;
pub mod reporter;
pub mod thresholds;
pub mod types;

pub use collector::MetricsCollector;
pub use thresholds::{ThresholdBreach, Thresholds};
pub use types::{CheckSummary, LatencyStats, MetricsSnapshot, RunSummary};
