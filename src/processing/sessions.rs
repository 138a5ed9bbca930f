//! Per-session duration and traffic values, passed through without matching.

use crate::models::SessionRecord;

/// Gauge values for one session, labelled by vdom, ipaddr, method and type.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionGauge {
    pub domain: String,
    pub ip_address: String,
    pub method: String,
    pub kind: String,
    pub duration_secs: f64,
    pub traffic_bytes: f64,
}

/// One gauge record per session. Unparseable IPs are kept as-is.
pub fn session_gauges(sessions: &[SessionRecord]) -> Vec<SessionGauge> {
    sessions
        .iter()
        .map(|s| SessionGauge {
            domain: s.domain.clone(),
            ip_address: s.ip_address.clone(),
            method: s.method.clone(),
            kind: s.kind.clone(),
            duration_secs: s.duration_secs as f64,
            traffic_bytes: s.traffic_vol_bytes as f64,
        })
        .collect()
}
