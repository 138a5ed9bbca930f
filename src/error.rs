//! Error types for the subnet usage exporter.
//!
//! Per-record variants are logged and skipped by the caller; only fetch and
//! decode failures abort a poll cycle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsageError {
    /// Address object `subnet` is not `"<ip> <mask>"`.
    #[error("invalid subnet format: '{0}'")]
    MalformedSubnetFormat(String),

    #[error("invalid IP address: '{0}'")]
    InvalidAddressFormat(String),

    #[error("invalid mask: '{0}'")]
    InvalidMaskFormat(String),

    #[error("unparseable session IP: '{0}'")]
    UnparseableSessionIp(String),

    /// Request to the appliance failed (connect, timeout or non-2xx status).
    #[error("error fetching {path}: {reason}")]
    FetchFailure { path: String, reason: String },

    /// Response body did not match the expected shape.
    #[error("error decoding {path}: path={json_path} error={reason}")]
    Decode {
        path: String,
        json_path: String,
        reason: String,
    },

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("config error: {0}")]
    Config(String),
}

impl UsageError {
    /// True for errors that abort the whole poll cycle.
    pub fn is_pass_level(&self) -> bool {
        matches!(
            self,
            UsageError::FetchFailure { .. } | UsageError::Decode { .. } | UsageError::Snapshot(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = UsageError::MalformedSubnetFormat("10.0.0.0/24".to_string());
        assert_eq!(e.to_string(), "invalid subnet format: '10.0.0.0/24'");

        let e = UsageError::FetchFailure {
            path: "/api/v2/monitor/user/firewall".to_string(),
            reason: "timeout".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "error fetching /api/v2/monitor/user/firewall: timeout"
        );
    }

    #[test]
    fn test_is_pass_level() {
        assert!(UsageError::Snapshot("missing".to_string()).is_pass_level());
        assert!(!UsageError::InvalidMaskFormat("x".to_string()).is_pass_level());
        assert!(!UsageError::UnparseableSessionIp("x".to_string()).is_pass_level());
    }
}
