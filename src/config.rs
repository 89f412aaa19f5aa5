use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_TARGET_TOTAL: u32 = 346;
pub const DEFAULT_TRAILING_WINDOWS: [u32; 3] = [7, 14, 21];
pub const DEFAULT_SCENARIO_PRESETS: [f64; 3] = [4.0, 5.0, 6.0];
pub const DEFAULT_CUSTOM_THROUGHPUT: f64 = 5.0;
pub const DEFAULT_EXTRA_INCREMENT: f64 = 2.0;

pub fn default_rollout_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 7).expect("2025-07-07 is a valid date")
}

pub fn default_support_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 14).expect("2025-10-14 is a valid date")
}

/// Everything one computation pass needs besides the events themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct RolloutConfig {
    pub target_total: u32,
    pub rollout_start: NaiveDate,
    pub support_end: NaiveDate,
    pub reference_date: NaiveDate,
    pub trailing_windows: Vec<u32>,
    pub scenario_presets: Vec<f64>,
    pub custom_throughput: f64,
    pub extra_increment: f64,
}

impl RolloutConfig {
    pub fn with_defaults(reference_date: NaiveDate) -> Self {
        Self {
            target_total: DEFAULT_TARGET_TOTAL,
            rollout_start: default_rollout_start(),
            support_end: default_support_end(),
            reference_date,
            trailing_windows: DEFAULT_TRAILING_WINDOWS.to_vec(),
            scenario_presets: DEFAULT_SCENARIO_PRESETS.to_vec(),
            custom_throughput: DEFAULT_CUSTOM_THROUGHPUT,
            extra_increment: DEFAULT_EXTRA_INCREMENT,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.support_end < self.rollout_start {
            return Err(ConfigError::EndBeforeStart {
                rollout_start: self.rollout_start,
                support_end: self.support_end,
            });
        }
        if self.trailing_windows.is_empty() {
            return Err(ConfigError::NoTrailingWindows);
        }
        if self.trailing_windows.contains(&0) {
            return Err(ConfigError::ZeroTrailingWindow);
        }
        Ok(())
    }
}

/// On-disk configuration. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub target_total: Option<u32>,
    pub rollout_start: Option<NaiveDate>,
    pub support_end: Option<NaiveDate>,
    pub reference_date: Option<NaiveDate>,
    pub trailing_windows: Option<Vec<u32>>,
    pub scenario_presets: Option<Vec<f64>>,
    pub custom_throughput: Option<f64>,
    pub extra_increment: Option<f64>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// JSON file with any subset of the settings below
    #[arg(long, env = "ROLLOUT_CONFIG")]
    pub config: Option<PathBuf>,
    /// Total number of machines the rollout must reach
    #[arg(long, env = "ROLLOUT_TARGET_TOTAL")]
    pub target_total: Option<u32>,
    /// First day of the rollout (YYYY-MM-DD)
    #[arg(long, env = "ROLLOUT_START")]
    pub rollout_start: Option<NaiveDate>,
    /// Day support ends (YYYY-MM-DD), excluded from the remaining days
    #[arg(long, env = "ROLLOUT_SUPPORT_END")]
    pub support_end: Option<NaiveDate>,
    /// Date to compute "as of" (defaults to today)
    #[arg(long, env = "ROLLOUT_REFERENCE_DATE")]
    pub reference_date: Option<NaiveDate>,
    /// Trailing windows in days, comma separated
    #[arg(long, value_delimiter = ',', env = "ROLLOUT_TRAILING_WINDOWS")]
    pub trailing_windows: Option<Vec<u32>>,
    /// Preset throughputs (upgrades per business day), comma separated
    #[arg(long, value_delimiter = ',', env = "ROLLOUT_SCENARIOS")]
    pub scenarios: Option<Vec<f64>>,
    /// One extra throughput to simulate
    #[arg(long, env = "ROLLOUT_THROUGHPUT")]
    pub throughput: Option<f64>,
    /// Extra upgrades per business day for the catch-up simulation
    #[arg(long, env = "ROLLOUT_INCREMENT", allow_negative_numbers = true)]
    pub increment: Option<f64>,
}

impl ConfigArgs {
    /// Layers defaults, the optional config file and the flags, in that order.
    pub fn resolve(&self, today: NaiveDate) -> Result<RolloutConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                ConfigFile::load(path)?
            }
            None => ConfigFile::default(),
        };

        let config = merge(RolloutConfig::with_defaults(today), file, self);
        config.validate()?;
        Ok(config)
    }
}

fn merge(defaults: RolloutConfig, file: ConfigFile, args: &ConfigArgs) -> RolloutConfig {
    RolloutConfig {
        target_total: args
            .target_total
            .or(file.target_total)
            .unwrap_or(defaults.target_total),
        rollout_start: args
            .rollout_start
            .or(file.rollout_start)
            .unwrap_or(defaults.rollout_start),
        support_end: args
            .support_end
            .or(file.support_end)
            .unwrap_or(defaults.support_end),
        reference_date: args
            .reference_date
            .or(file.reference_date)
            .unwrap_or(defaults.reference_date),
        trailing_windows: args
            .trailing_windows
            .clone()
            .or(file.trailing_windows)
            .unwrap_or(defaults.trailing_windows),
        scenario_presets: args
            .scenarios
            .clone()
            .or(file.scenario_presets)
            .unwrap_or(defaults.scenario_presets),
        custom_throughput: args
            .throughput
            .or(file.custom_throughput)
            .unwrap_or(defaults.custom_throughput),
        extra_increment: args
            .increment
            .or(file.extra_increment)
            .unwrap_or(defaults.extra_increment),
    }
}
