//! Longest-prefix matching of session IPs and per-subnet aggregation.

use crate::error::UsageError;
use crate::models::{as_ipv4, Ipv4, NormalizedSubnet, SessionRecord};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};

/// Find every subnet containing `ip` at the greatest prefix length.
///
/// Equal-prefix matches are all kept, in index order. The running best starts
/// at 0, so /0 subnets take the equality branch: a lone /0 is returned, and
/// any longer match replaces it.
pub fn find_longest_prefix_match(ip: Ipv4Addr, subnets: &[NormalizedSubnet]) -> Vec<&NormalizedSubnet> {
    let mut best_prefix: u8 = 0;
    let mut matches: Vec<&NormalizedSubnet> = Vec::new();

    for subnet in subnets.iter().filter(|s| s.network.contains(ip)) {
        let prefix = subnet.prefix_len();
        if prefix > best_prefix {
            best_prefix = prefix;
            matches.clear();
            matches.push(subnet);
        } else if prefix == best_prefix {
            matches.push(subnet);
        }
    }

    matches
}

/// Parse a session IP and match it against the index.
///
/// IPv6 addresses without an IPv4-mapped form match nothing.
pub fn match_session<'a>(
    session: &SessionRecord,
    subnets: &'a [NormalizedSubnet],
) -> Result<Vec<&'a NormalizedSubnet>, UsageError> {
    let ip: IpAddr = session
        .ip_address
        .parse()
        .map_err(|_| UsageError::UnparseableSessionIp(session.ip_address.clone()))?;

    match as_ipv4(ip) {
        Some(v4) => Ok(find_longest_prefix_match(v4, subnets)),
        None => {
            log::debug!("No IPv4 form for session {ip}, vdom='{}'", session.domain);
            Ok(Vec::new())
        }
    }
}

/// Composite counter key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubnetKey {
    pub domain: String,
    pub subnet_name: String,
}

impl SubnetKey {
    pub fn new(domain: &str, subnet_name: &str) -> SubnetKey {
        SubnetKey {
            domain: domain.to_string(),
            subnet_name: subnet_name.to_string(),
        }
    }
}

/// One exported observation: active sessions in a subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetUsage {
    pub domain: String,
    pub subnet_name: String,
    pub subnet: Ipv4,
    pub count: u64,
}

/// Active-session counts per (domain, subnet name) for one poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateCounter {
    counts: HashMap<SubnetKey, (Ipv4, u64)>,
    /// Sessions dropped because their IP did not parse.
    pub skipped_sessions: usize,
    /// Sessions that parsed but matched no subnet.
    pub unmatched_sessions: usize,
}

impl AggregateCounter {
    pub fn new() -> AggregateCounter {
        AggregateCounter::default()
    }

    /// Count one session against `subnet`. The first network seen for a key is kept.
    pub fn increment(&mut self, subnet: &NormalizedSubnet) {
        self.counts
            .entry(SubnetKey::new(&subnet.domain, &subnet.name))
            .or_insert((subnet.network, 0))
            .1 += 1;
    }

    /// Count for a key, 0 when never incremented.
    pub fn get(&self, domain: &str, subnet_name: &str) -> u64 {
        self.counts
            .get(&SubnetKey::new(domain, subnet_name))
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum over all keys; larger than the session count when ties fan out.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|(_, count)| count).sum()
    }

    /// Flat observation records. Order is unspecified.
    pub fn usage(&self) -> Vec<SubnetUsage> {
        self.counts
            .iter()
            .map(|(key, (subnet, count))| SubnetUsage {
                domain: key.domain.clone(),
                subnet_name: key.subnet_name.clone(),
                subnet: *subnet,
                count: *count,
            })
            .collect()
    }
}

/// Match every session against the full index and count each tied match.
pub fn aggregate(sessions: &[SessionRecord], subnets: &[NormalizedSubnet]) -> AggregateCounter {
    let mut counter = AggregateCounter::new();

    for session in sessions {
        let matches = match match_session(session, subnets) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("Skipping session vdom='{}': {e}", session.domain);
                counter.skipped_sessions += 1;
                continue;
            }
        };

        if matches.is_empty() {
            counter.unmatched_sessions += 1;
        } else if matches.len() > 1 {
            log::debug!(
                "Session {} matches {} subnets at /{}",
                session.ip_address,
                matches.len(),
                matches[0].prefix_len()
            );
        }

        for subnet in matches {
            counter.increment(subnet);
        }
    }

    counter
}
