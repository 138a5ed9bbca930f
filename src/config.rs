//! Runtime configuration.
//!
//! Values come from the process environment, after `.env` has been loaded by `main`.

use crate::error::UsageError;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// What to print to stdout after each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    None,
}

impl std::str::FromStr for OutputFormat {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "none" | "" => Ok(OutputFormat::None),
            other => Err(UsageError::Config(format!(
                "OUTPUT_FORMAT must be table, csv or none, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Appliance base URL, e.g. `https://fw.example.net`.
    pub base_url: Option<String>,
    pub token: Option<String>,
    /// Read both datasets from this file instead of the API.
    pub snapshot_file: Option<String>,
    /// Write each live snapshot to a dated file in the working directory.
    pub save_snapshot: bool,
    pub insecure_tls: bool,
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Prometheus listen address; no exporter when unset.
    pub metrics_listen: Option<String>,
    pub output: OutputFormat,
    pub run_once: bool,
}

impl Config {
    pub fn from_env() -> Result<Config, UsageError> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, UsageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            base_url: get("FORTIGATE_URL").map(|url| url.trim_end_matches('/').to_string()),
            token: get("FORTIGATE_TOKEN"),
            snapshot_file: get("FORTIGATE_SNAPSHOT_FILE"),
            save_snapshot: parse_bool("FORTIGATE_SAVE_SNAPSHOT", get("FORTIGATE_SAVE_SNAPSHOT"))?,
            insecure_tls: parse_bool("FORTIGATE_INSECURE", get("FORTIGATE_INSECURE"))?,
            timeout: parse_secs(
                "FORTIGATE_TIMEOUT_SECS",
                get("FORTIGATE_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?,
            poll_interval: parse_secs(
                "POLL_INTERVAL_SECS",
                get("POLL_INTERVAL_SECS"),
                DEFAULT_POLL_INTERVAL_SECS,
            )?,
            metrics_listen: get("METRICS_LISTEN"),
            output: match get("OUTPUT_FORMAT") {
                Some(v) => v.parse()?,
                None => OutputFormat::Table,
            },
            run_once: parse_bool("RUN_ONCE", get("RUN_ONCE"))?,
        };

        if config.snapshot_file.is_none() && (config.base_url.is_none() || config.token.is_none())
        {
            return Err(UsageError::Config(
                "set FORTIGATE_URL and FORTIGATE_TOKEN, or FORTIGATE_SNAPSHOT_FILE".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: Option<String>) -> Result<bool, UsageError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(UsageError::Config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}

fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<Duration, UsageError> {
    let secs = match value {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map_err(|_| UsageError::Config(format!("{key} must be whole seconds, got '{v}'")))?,
        None => default,
    };
    if secs == 0 {
        return Err(UsageError::Config(format!("{key} must be greater than 0")));
    }
    Ok(Duration::from_secs(secs))
}
