use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::domain::{PayloadFactory, DEFAULT_AUTHOR_ID, DEFAULT_ID_PREFIX, DEFAULT_PULL_REQUEST_NAME};
use crate::error::Result;
use crate::metrics::Thresholds;

pub const DEFAULT_CONFIG_FILE: &str = "loadtest.toml";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const ENV_PREFIX: &str = "PRLOAD__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub target: TargetConfig,
    #[validate(nested)]
    pub load: LoadConfig,
    #[validate(nested)]
    pub payload: PayloadConfig,
    #[validate(nested)]
    pub report: ReportConfig,
    #[validate(nested)]
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TargetConfig {
    #[validate(url)]
    pub base_url: String,
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
    /// Probe `/health` before starting the load
    pub health_check: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 60,
            health_check: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LoadConfig {
    #[validate(range(min = 1))]
    pub vus: u32,
    /// At most a week
    #[validate(range(min = 1, max = 604_800))]
    pub duration_secs: u64,
    #[validate(range(max = 3_600_000))]
    pub think_time_ms: u64,
    #[validate(range(min = 1))]
    pub max_iterations: Option<u64>,
    #[validate(range(max = 3_600))]
    pub graceful_stop_secs: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            vus: 50,
            duration_secs: 30,
            think_time_ms: 100,
            max_iterations: None,
            graceful_stop_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PayloadConfig {
    #[validate(length(min = 1))]
    pub id_prefix: String,
    #[validate(length(min = 1))]
    pub pull_request_name: String,
    /// Must already exist in the target service
    #[validate(length(min = 1))]
    pub author_id: String,
}

impl PayloadConfig {
    pub fn factory(&self) -> PayloadFactory {
        PayloadFactory::new(
            self.id_prefix.clone(),
            self.pull_request_name.clone(),
            self.author_id.clone(),
        )
    }
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            pull_request_name: DEFAULT_PULL_REQUEST_NAME.to_string(),
            author_id: DEFAULT_AUTHOR_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReportConfig {
    #[validate(range(min = 1))]
    pub interval_secs: u64,
    pub summary_export: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            summary_export: None,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file, then `PRLOAD__SECTION__KEY` variables,
    /// then a plain `BASE_URL` variable. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&["BASE_URL"])
                    .map(|_| "target.base_url".into()),
            );
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }
}
