use std::path::PathBuf;

use chrono::NaiveDate;

/// Errors raised while reading the event table.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column `{0}` not found in header")]
    MissingColumn(String),
}

/// Errors raised while assembling the run configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("support end {support_end} precedes rollout start {rollout_start}")]
    EndBeforeStart {
        rollout_start: NaiveDate,
        support_end: NaiveDate,
    },

    #[error("at least one trailing window is required")]
    NoTrailingWindows,

    #[error("trailing windows must be at least one day long")]
    ZeroTrailingWindow,
}
