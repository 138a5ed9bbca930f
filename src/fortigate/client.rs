//! FortiGate REST API client.
//!
//! Every request is scoped to all VDOMs with `vdom=*` and authenticated with the
//! API token as a bearer header.

use super::snapshot::Snapshot;
use crate::error::UsageError;
use crate::models::{FirewallAddressData, UserFirewall};
use colored::Colorize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Configured firewall address objects.
pub const FIREWALL_ADDRESS_PATH: &str = "/api/v2/cmdb/firewall/address";
/// Currently authenticated firewall users.
pub const USER_FIREWALL_PATH: &str = "/api/v2/monitor/user/firewall";

/// Response size limit, far above any sane address table.
const MAX_RESPONSE_BYTES: usize = 32 * 1024 * 1024;

pub struct FortiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl FortiClient {
    pub fn new(
        base_url: &str,
        token: &str,
        timeout: Duration,
        insecure_tls: bool,
    ) -> Result<FortiClient, UsageError> {
        if insecure_tls {
            log::warn!("TLS certificate verification disabled for {base_url}");
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure_tls)
            .build()
            .map_err(|e| UsageError::Config(format!("Error building HTTP client: {e}")))?;

        Ok(FortiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn get_text(&self, path: &str) -> Result<String, UsageError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {url}?vdom=*", url = url.as_str().on_blue());

        let fetch_err = |reason: String| UsageError::FetchFailure {
            path: path.to_string(),
            reason,
        };

        let response = self
            .http
            .get(&url)
            .query(&[("vdom", "*")])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        let response = response.error_for_status().map_err(|e| {
            log::warn!("{failed} GET {path}: {status}", failed = "failed".on_red());
            fetch_err(e.to_string())
        })?;

        let body = read_body(response, MAX_RESPONSE_BYTES)
            .await
            .map_err(fetch_err)?;
        log::debug!("Success GET {path}: status={status} body.len()={}", body.len());
        Ok(body)
    }

    /// GET `path` and decode the per-VDOM envelopes.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, UsageError> {
        let body = self.get_text(path).await?;
        decode_response(path, &body)
    }

    /// Fetch both datasets concurrently. Either failing fails the snapshot.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, UsageError> {
        let (addresses, sessions) = futures::try_join!(
            self.get_json::<FirewallAddressData>(FIREWALL_ADDRESS_PATH),
            self.get_json::<UserFirewall>(USER_FIREWALL_PATH),
        )?;

        log::info!(
            "Fetched {} address VDOM block(s) and {} user VDOM block(s)",
            addresses.len(),
            sessions.len()
        );

        Ok(Snapshot::new(addresses, sessions))
    }
}

/// Read a response body of at most `limit` bytes.
///
/// A declared Content-Length over the limit is refused before reading; a body
/// without one is read chunk by chunk and abandoned once it passes the limit.
async fn read_body(mut response: reqwest::Response, limit: usize) -> Result<String, String> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(format!("Response too large: {len} bytes declared"));
        }
    }

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| e.to_string())? {
        if body.len() + chunk.len() > limit {
            return Err(format!("Response too large: over {limit} bytes"));
        }
        body.extend_from_slice(&chunk);
    }

    String::from_utf8(body).map_err(|e| format!("Response is not UTF-8: {e}"))
}

/// Decode an API body that is either an array of VDOM envelopes (`vdom=*` on a
/// multi-VDOM appliance) or a single envelope.
pub fn decode_response<T: DeserializeOwned>(path: &str, body: &str) -> Result<Vec<T>, UsageError> {
    let decode_err = |e: serde_path_to_error::Error<serde_json::Error>| {
        log::trace!("BODY START:\n\n{}\n\nBODY END\n", body);
        UsageError::Decode {
            path: path.to_string(),
            json_path: e.path().to_string(),
            reason: e.inner().to_string(),
        }
    };

    let mut deserializer = serde_json::Deserializer::from_str(body);
    if body.trim_start().starts_with('[') {
        serde_path_to_error::deserialize(&mut deserializer).map_err(decode_err)
    } else {
        let single: T = serde_path_to_error::deserialize(&mut deserializer).map_err(decode_err)?;
        Ok(vec![single])
    }
}
