//! Prometheus exposition of the per-subnet and per-session gauges.

use crate::error::UsageError;
use crate::processing::PassOutput;
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use metrics_util::MetricKindMask;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

// ============================================================================
// Metric Names
// ============================================================================

/// Active users per configured subnet.
pub const USER_COUNT_PER_SUBNET: &str = "fortigate_user_count_per_subnet";
/// Per-session authenticated duration.
pub const USER_FIREWALL_DURATION_SECONDS: &str = "fortigate_user_firewall_duration_seconds";
/// Per-session traffic volume.
pub const USER_FIREWALL_TRAFFIC_BYTES: &str = "fortigate_user_firewall_traffic_bytes";

/// Start the Prometheus HTTP listener.
///
/// Gauges not set again within `idle_timeout` are dropped. [`Publisher`]
/// zeroes vanished series at once; the timeout removes them afterwards and
/// also covers a run of failed cycles.
pub fn init_prometheus(listen: &str, idle_timeout: Duration) -> Result<(), UsageError> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| UsageError::Config(format!("invalid metrics listen address: {e}")))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .idle_timeout(MetricKindMask::GAUGE, Some(idle_timeout))
        .install()
        .map_err(|e| UsageError::Config(format!("failed to install prometheus exporter: {e}")))?;

    describe_metrics();
    log::info!("Prometheus exporter listening on {addr}");
    Ok(())
}

pub fn describe_metrics() {
    describe_gauge!(USER_COUNT_PER_SUBNET, "Number of active users per subnet");
    describe_gauge!(
        USER_FIREWALL_DURATION_SECONDS,
        "Duration of user firewall activity in seconds"
    );
    describe_gauge!(
        USER_FIREWALL_TRAFFIC_BYTES,
        "Traffic volume in bytes for user firewall activity"
    );
}

/// `(vdom, subnet_name, subnet)` label values of one subnet count series.
type SubnetLabels = (String, String, String);
/// `(vdom, ipaddr, method, type)` label values of one session series.
type SessionLabels = (String, String, String, String);

fn set_subnet_count(labels: &SubnetLabels, count: f64) {
    let (vdom, subnet_name, subnet) = labels;
    gauge!(
        USER_COUNT_PER_SUBNET,
        "subnet_name" => subnet_name.clone(),
        "subnet" => subnet.clone(),
        "vdom" => vdom.clone()
    )
    .set(count);
}

fn set_session(labels: &SessionLabels, duration_secs: f64, traffic_bytes: f64) {
    let (vdom, ipaddr, method, kind) = labels;
    gauge!(
        USER_FIREWALL_DURATION_SECONDS,
        "vdom" => vdom.clone(),
        "ipaddr" => ipaddr.clone(),
        "method" => method.clone(),
        "type" => kind.clone()
    )
    .set(duration_secs);
    gauge!(
        USER_FIREWALL_TRAFFIC_BYTES,
        "vdom" => vdom.clone(),
        "ipaddr" => ipaddr.clone(),
        "method" => method.clone(),
        "type" => kind.clone()
    )
    .set(traffic_bytes);
}

/// Publishes passes into the installed recorder.
///
/// Remembers the series set by the previous pass. A series missing from the
/// current pass is set to 0 once and then left for the idle timeout to drop,
/// so an emptied subnet or an ended session never keeps its old value.
#[derive(Debug, Default)]
pub struct Publisher {
    subnets: HashSet<SubnetLabels>,
    sessions: HashSet<SessionLabels>,
}

impl Publisher {
    pub fn new() -> Publisher {
        Publisher::default()
    }

    /// Set every gauge from one pass and zero the series that disappeared.
    pub fn publish(&mut self, output: &PassOutput) {
        let mut subnets = HashSet::new();
        for usage in output.usage.usage() {
            let labels = (usage.domain, usage.subnet_name, usage.subnet.to_string());
            set_subnet_count(&labels, usage.count as f64);
            subnets.insert(labels);
        }
        for gone in self.subnets.difference(&subnets) {
            log::debug!("subnet {}/{} has no users, zeroing", gone.0, gone.1);
            set_subnet_count(gone, 0.0);
        }
        self.subnets = subnets;

        let mut sessions = HashSet::new();
        for s in &output.sessions {
            let labels = (
                s.domain.clone(),
                s.ip_address.clone(),
                s.method.clone(),
                s.kind.clone(),
            );
            set_session(&labels, s.duration_secs, s.traffic_bytes);
            sessions.insert(labels);
        }
        for gone in self.sessions.difference(&sessions) {
            log::debug!("session {} in vdom {} ended, zeroing", gone.1, gone.0);
            set_session(gone, 0.0, 0.0);
        }
        self.sessions = sessions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fortigate::{read_snapshot, Snapshot};
    use crate::processing::aggregate_pass;

    fn render(output: &PassOutput) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            describe_metrics();
            Publisher::new().publish(output);
        });
        handle.render()
    }

    fn value_of(rendered: &str, metric: &str, label: &str) -> Option<f64> {
        rendered
            .lines()
            .find(|line| line.starts_with(metric) && line.contains(label))
            .and_then(|line| line.rsplit(' ').next())
            .and_then(|v| v.parse().ok())
    }

    #[test]
    fn test_publish_subnet_counts() {
        let snapshot = read_snapshot("src/tests/test_data/snapshot_02.json").unwrap();
        let rendered = render(&aggregate_pass(&snapshot));

        let line = rendered
            .lines()
            .find(|l| l.starts_with(USER_COUNT_PER_SUBNET) && l.contains("subnet_name=\"net-a\""))
            .expect("net-a gauge rendered");
        assert!(line.contains("subnet=\"10.0.0.0/24\""), "{line}");
        assert!(line.contains("vdom=\"root\""), "{line}");
        assert_eq!(
            value_of(&rendered, USER_COUNT_PER_SUBNET, "subnet_name=\"net-a\""),
            Some(1.0)
        );
        assert!(
            !rendered.contains("subnet_name=\"net-b\""),
            "shorter prefix must not be exported"
        );
    }

    #[test]
    fn test_publish_session_gauges() {
        let snapshot = read_snapshot("src/tests/test_data/snapshot_02.json").unwrap();
        let rendered = render(&aggregate_pass(&snapshot));

        assert_eq!(
            value_of(&rendered, USER_FIREWALL_DURATION_SECONDS, "ipaddr=\"10.0.0.5\""),
            Some(10.0)
        );
        assert_eq!(
            value_of(&rendered, USER_FIREWALL_TRAFFIC_BYTES, "ipaddr=\"10.0.0.5\""),
            Some(100.0)
        );
        assert!(rendered.contains("method=\"Firewall\""));
        assert!(rendered.contains("type=\"auth_logon\""));
    }

    fn snapshot_02() -> Snapshot {
        read_snapshot("src/tests/test_data/snapshot_02.json").unwrap()
    }

    #[test]
    fn test_emptied_subnet_drops_to_zero() {
        let first = snapshot_02();
        let mut second = snapshot_02();
        second.sessions.clear();

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let mut publisher = Publisher::new();

        metrics::with_local_recorder(&recorder, || publisher.publish(&aggregate_pass(&first)));
        let rendered = handle.render();
        assert_eq!(
            value_of(&rendered, USER_COUNT_PER_SUBNET, "subnet_name=\"net-a\""),
            Some(1.0)
        );

        metrics::with_local_recorder(&recorder, || publisher.publish(&aggregate_pass(&second)));
        let rendered = handle.render();
        assert_eq!(
            value_of(&rendered, USER_COUNT_PER_SUBNET, "subnet_name=\"net-a\""),
            Some(0.0)
        );
        assert_eq!(
            value_of(&rendered, USER_FIREWALL_DURATION_SECONDS, "ipaddr=\"10.0.0.5\""),
            Some(0.0)
        );
        assert_eq!(
            value_of(&rendered, USER_FIREWALL_TRAFFIC_BYTES, "ipaddr=\"10.0.0.5\""),
            Some(0.0)
        );
    }

    #[test]
    fn test_changed_count_is_replaced() {
        let mut first = snapshot_02();
        let mut extra = first.sessions[0].results[0].clone();
        extra.ipaddr = "10.0.0.6".to_string();
        extra.duration_secs = 20;
        first.sessions[0].results.push(extra);
        let second = snapshot_02();

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let mut publisher = Publisher::new();

        metrics::with_local_recorder(&recorder, || publisher.publish(&aggregate_pass(&first)));
        assert_eq!(
            value_of(&handle.render(), USER_COUNT_PER_SUBNET, "subnet_name=\"net-a\""),
            Some(2.0)
        );

        metrics::with_local_recorder(&recorder, || publisher.publish(&aggregate_pass(&second)));
        let rendered = handle.render();
        assert_eq!(
            value_of(&rendered, USER_COUNT_PER_SUBNET, "subnet_name=\"net-a\""),
            Some(1.0)
        );
        assert_eq!(
            value_of(&rendered, USER_FIREWALL_DURATION_SECONDS, "ipaddr=\"10.0.0.5\""),
            Some(10.0)
        );
        assert_eq!(
            value_of(&rendered, USER_FIREWALL_DURATION_SECONDS, "ipaddr=\"10.0.0.6\""),
            Some(0.0)
        );
    }

    #[test]
    fn test_init_prometheus_bad_address() {
        let err = init_prometheus("not-an-address", Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, UsageError::Config(_)));
    }
}
