//! Snapshot files of both datasets.
//!
//! A snapshot lets a cycle run offline from a saved file, and live fetches can
//! be saved for later replay or test fixtures.

use super::client::FortiClient;
use crate::config::Config;
use crate::error::UsageError;
use crate::models::{FirewallAddressData, UserFirewall};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Both decoded datasets from one poll.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct Snapshot {
    pub addresses: Vec<FirewallAddressData>,
    pub sessions: Vec<UserFirewall>,
    /// RFC 3339 fetch time, absent in hand-written files.
    #[serde(default)]
    pub fetched_at: Option<String>,
}

impl Snapshot {
    pub fn new(addresses: Vec<FirewallAddressData>, sessions: Vec<UserFirewall>) -> Snapshot {
        Snapshot {
            addresses,
            sessions,
            fetched_at: Some(chrono::Local::now().to_rfc3339()),
        }
    }
}

/// Read a snapshot file.
pub fn read_snapshot(file: &str) -> Result<Snapshot, UsageError> {
    if !Path::new(file).exists() {
        return Err(UsageError::Snapshot(format!(
            "Snapshot file does not exist: {file}"
        )));
    }
    let json = std::fs::read_to_string(file)
        .map_err(|e| UsageError::Snapshot(format!("Error reading {file}: {e}")))?;

    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let snapshot: Snapshot = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        UsageError::Snapshot(format!(
            "Error parsing {file}: path={} error={}",
            e.path(),
            e.inner()
        ))
    })?;

    log::info!(
        "Read snapshot {file} fetched_at={}",
        snapshot.fetched_at.as_deref().unwrap_or("unknown")
    );
    Ok(snapshot)
}

/// Dated snapshot file name; one file per day, later polls overwrite it.
pub fn snapshot_file_name() -> String {
    format!(
        "fortigate_snapshot_{}.json",
        chrono::Local::now().format("%Y-%m-%d")
    )
}

/// Write `snapshot` to a dated file in `dir`, returning its path.
pub fn write_snapshot(snapshot: &Snapshot, dir: &Path) -> Result<PathBuf, UsageError> {
    let path = dir.join(snapshot_file_name());
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| UsageError::Snapshot(format!("Error serializing snapshot: {e}")))?;
    std::fs::write(&path, json)
        .map_err(|e| UsageError::Snapshot(format!("Error writing {}: {e}", path.display())))?;
    log::info!("Wrote snapshot to {}", path.display());
    Ok(path)
}

/// Load the datasets for one cycle: the configured file, else the live API.
pub async fn load_snapshot(
    config: &Config,
    client: Option<&FortiClient>,
) -> Result<Snapshot, UsageError> {
    if let Some(file) = &config.snapshot_file {
        return read_snapshot(file);
    }

    let client = client.ok_or_else(|| {
        UsageError::Config("no snapshot file and no API client configured".to_string())
    })?;
    let snapshot = client.fetch_snapshot().await?;

    if config.save_snapshot {
        // a failed save does not cost the cycle
        if let Err(e) = write_snapshot(&snapshot, Path::new(".")) {
            log::warn!("{e}");
        }
    }
    Ok(snapshot)
}
