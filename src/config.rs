use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::{Error, Result};

/// Chunk width used when no override is given; preserves the original
/// hardcoded value (see SPEC_FULL.md §9).
pub const DEFAULT_CHUNK_RANGE_SECS: i64 = 10_000;

#[derive(Debug, Parser)]
#[command(name = "ltop", about = "Terminal log monitoring with in-memory time-series alerting")]
pub struct Cli {
    /// Path to the log file to tail.
    #[arg(short = 'l', long = "log-file", default_value = "/tmp/access.log")]
    pub log_file: PathBuf,

    /// Name of the filter to apply to each tailed line. `http-access-log` is
    /// the only built-in. Required.
    #[arg(short = 'f', long = "filter")]
    pub filter: String,

    /// Seconds between counter samples.
    #[arg(short = 'c', long = "collect-interval", default_value_t = 5)]
    pub collect_interval: u64,

    /// Step, in seconds, for summary series.
    #[arg(short = 'e', long = "evaluate-interval", default_value_t = 10)]
    pub evaluate_interval: i64,

    /// Requests-per-second threshold that triggers an alert.
    #[arg(long = "alert-threshold", default_value_t = 10.0)]
    pub alert_threshold: f64,

    /// Monitor evaluation period, in seconds.
    #[arg(long = "alert-evaluate-interval", default_value_t = 120)]
    pub alert_evaluate_interval: u64,
}

/// Immutable, validated configuration used to construct an `Engine`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub log_file: PathBuf,
    pub filter_name: String,
    pub collect_interval: Duration,
    pub evaluate_interval_s: i64,
    pub alert_threshold: f64,
    pub alert_evaluate_interval_s: u64,
    pub chunk_range_secs: i64,
}

impl TryFrom<Cli> for EngineConfig {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self> {
        if cli.collect_interval == 0 {
            return Err(Error::Config("--collect-interval must be > 0".into()));
        }
        if cli.evaluate_interval <= 0 {
            return Err(Error::Config("--evaluate-interval must be > 0".into()));
        }
        if cli.alert_threshold < 0.0 {
            return Err(Error::Config("--alert-threshold must be >= 0".into()));
        }
        if cli.alert_evaluate_interval == 0 {
            return Err(Error::Config("--alert-evaluate-interval must be > 0".into()));
        }
        if cli.filter.trim().is_empty() {
            return Err(Error::Config("--filter is required".into()));
        }

        Ok(EngineConfig {
            log_file: cli.log_file,
            filter_name: cli.filter,
            collect_interval: Duration::from_secs(cli.collect_interval),
            evaluate_interval_s: cli.evaluate_interval,
            alert_threshold: cli.alert_threshold,
            alert_evaluate_interval_s: cli.alert_evaluate_interval,
            chunk_range_secs: DEFAULT_CHUNK_RANGE_SECS,
        })
    }
}
