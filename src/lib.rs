// cargo watch -x 'fmt' -x 'run'

pub mod config;
pub mod error;
pub mod fortigate;
pub mod logging;
pub mod models;
pub mod output;
pub mod processing;

use config::{Config, OutputFormat};
use error::UsageError;
use fortigate::{load_snapshot, FortiClient};
use output::prometheus::Publisher;
use processing::{aggregate_pass, PassOutput};
use std::error::Error;

/// API client for live mode, None when reading a snapshot file.
pub fn build_client(config: &Config) -> Result<Option<FortiClient>, UsageError> {
    if config.snapshot_file.is_some() {
        return Ok(None);
    }
    match (&config.base_url, &config.token) {
        (Some(url), Some(token)) => Ok(Some(FortiClient::new(
            url,
            token,
            config.timeout,
            config.insecure_tls,
        )?)),
        _ => Err(UsageError::Config(
            "FORTIGATE_URL and FORTIGATE_TOKEN are required".to_string(),
        )),
    }
}

/// One poll cycle: load, aggregate, publish, print.
///
/// A fetch or snapshot failure returns before anything is published.
pub async fn poll_cycle(
    config: &Config,
    client: Option<&FortiClient>,
    publisher: Option<&mut Publisher>,
) -> Result<PassOutput, UsageError> {
    let snapshot = load_snapshot(config, client).await?;
    let output = aggregate_pass(&snapshot);

    if let Some(publisher) = publisher {
        publisher.publish(&output);
    }
    match config.output {
        OutputFormat::Table => output::print_table(&output),
        OutputFormat::Csv => output::print_csv(&output),
        OutputFormat::None => {}
    }

    Ok(output)
}

/// Poll until Ctrl-C, or once when `run_once` is set.
///
/// Failed cycles are logged and skipped; with `run_once` the failure is returned.
pub async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let client = build_client(&config)?;

    let mut publisher = match &config.metrics_listen {
        Some(listen) => {
            output::prometheus::init_prometheus(listen, config.poll_interval * 2)?;
            Some(Publisher::new())
        }
        None => None,
    };

    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        match poll_cycle(&config, client.as_ref(), publisher.as_mut()).await {
            Ok(output) => log::info!(
                "cycle #{cycle}: {} subnet counter(s), {} session(s)",
                output.usage.len(),
                output.sessions.len()
            ),
            Err(e) if e.is_pass_level() && !config.run_once => {
                log::error!("cycle #{cycle} skipped: {e}");
            }
            Err(e) => return Err(e.into()),
        }

        if config.run_once {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval) => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("Ctrl-C received, stopping after {cycle} cycle(s)");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_config(file: &str) -> Config {
        let file = file.to_string();
        Config::from_lookup(move |key| match key {
            "FORTIGATE_SNAPSHOT_FILE" => Some(file.clone()),
            "OUTPUT_FORMAT" => Some("none".to_string()),
            "RUN_ONCE" => Some("true".to_string()),
            _ => None,
        })
        .expect("valid snapshot config")
    }

    #[test]
    fn test_build_client_snapshot_mode() {
        let config = snapshot_config("src/tests/test_data/snapshot_01.json");
        assert!(build_client(&config).unwrap().is_none());
    }

    #[test]
    fn test_build_client_live_mode() {
        let config = Config::from_lookup(|key| match key {
            "FORTIGATE_URL" => Some("https://fw.example.net".to_string()),
            "FORTIGATE_TOKEN" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(build_client(&config).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_poll_cycle_from_snapshot() {
        let config = snapshot_config("src/tests/test_data/snapshot_01.json");
        let output = poll_cycle(&config, None, None).await.expect("cycle runs");
        assert_eq!(output.usage.get("root", "lan"), 1);
        assert_eq!(output.usage.get("guest", "lan"), 1);
        assert_eq!(output.sessions.len(), 6);
    }

    #[tokio::test]
    async fn test_run_once_missing_snapshot_fails() {
        let config = snapshot_config("src/tests/test_data/missing.json");
        assert!(run(config).await.is_err());
    }

    #[tokio::test]
    async fn test_run_once_ok() {
        let config = snapshot_config("src/tests/test_data/snapshot_02.json");
        run(config).await.expect("single cycle succeeds");
    }
}
