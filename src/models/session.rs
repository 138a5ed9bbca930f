//! Active user-firewall sessions as returned by `/api/v2/monitor/user/firewall`.

use serde::{Deserialize, Serialize};

/// One authenticated firewall user.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UserFirewallResult {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub duration_secs: i64,
    #[serde(default)]
    pub auth_type: i64,
    #[serde(default)]
    pub ipaddr: String,
    #[serde(default)]
    pub src_type: String,
    #[serde(default)]
    pub expiry_secs: i64,
    #[serde(default)]
    pub traffic_vol_bytes: i64,
    #[serde(default)]
    pub method: String,
}

/// Per-VDOM response envelope.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UserFirewall {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub results: Vec<UserFirewallResult>,
    #[serde(default)]
    pub vdom: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub build: i64,
}

/// An active session bound to one IP, scoped to its domain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionRecord {
    /// Unparsed; validated when matched.
    pub ip_address: String,
    pub domain: String,
    pub duration_secs: i64,
    pub traffic_vol_bytes: i64,
    pub method: String,
    pub kind: String,
}

impl SessionRecord {
    pub fn new(ip_address: &str, domain: &str) -> SessionRecord {
        SessionRecord {
            ip_address: ip_address.to_string(),
            domain: domain.to_string(),
            ..Default::default()
        }
    }
}

/// Flatten per-VDOM envelopes into session records, in response order.
pub fn session_records(data: &[UserFirewall]) -> Vec<SessionRecord> {
    data.iter()
        .flat_map(|fw| {
            fw.results.iter().map(move |r| SessionRecord {
                ip_address: r.ipaddr.clone(),
                domain: fw.vdom.clone(),
                duration_secs: r.duration_secs,
                traffic_vol_bytes: r.traffic_vol_bytes,
                method: r.method.clone(),
                kind: r.kind.clone(),
            })
        })
        .collect()
}
