use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Load generator for the pull-request service
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "pr-loadtest")]
#[command(about = "Hammer POST /pullRequest/create with concurrent virtual users")]
#[command(version)]
pub struct Cli {
    /// TOML config file (defaults to ./loadtest.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the PR service (overrides BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Number of concurrent virtual users
    #[arg(long)]
    pub vus: Option<u32>,

    /// Test duration in seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Pause between iterations in milliseconds
    #[arg(long)]
    pub think_time_ms: Option<u64>,

    /// Stop each virtual user after this many iterations
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Author id sent with every request; must be seeded in the service
    #[arg(long)]
    pub author_id: Option<String>,

    /// Skip the GET /health probe before starting
    #[arg(long)]
    pub skip_health_check: bool,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    pub summary_export: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Command line flags take precedence over every other config source
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(base_url) = &self.base_url {
            cfg.target.base_url = base_url.clone();
        }
        if let Some(vus) = self.vus {
            cfg.load.vus = vus;
        }
        if let Some(duration) = self.duration {
            cfg.load.duration_secs = duration;
        }
        if let Some(think_time_ms) = self.think_time_ms {
            cfg.load.think_time_ms = think_time_ms;
        }
        if let Some(iterations) = self.iterations {
            cfg.load.max_iterations = Some(iterations);
        }
        if let Some(author_id) = &self.author_id {
            cfg.payload.author_id = author_id.clone();
        }
        if self.skip_health_check {
            cfg.target.health_check = false;
        }
        if let Some(path) = &self.summary_export {
            cfg.report.summary_export = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "pr-loadtest",
            "--base-url",
            "http://pr:8080",
            "--vus",
            "3",
            "--duration",
            "5",
            "--author-id",
            "u777",
            "--skip-health-check",
        ]);
        let mut cfg = Config::default();
        cli.apply(&mut cfg);

        assert_eq!(cfg.target.base_url, "http://pr:8080");
        assert_eq!(cfg.load.vus, 3);
        assert_eq!(cfg.load.duration_secs, 5);
        assert_eq!(cfg.payload.author_id, "u777");
        assert!(!cfg.target.health_check);
        assert_eq!(cfg.load.think_time_ms, 100);
    }

    #[test]
    fn test_no_flags_leave_config_untouched() {
        let cli = Cli::parse_from(["pr-loadtest"]);
        let mut cfg = Config::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg, Config::default());
    }
}
