//! Subnet usage processing logic.
//!
//! This module contains the core of a poll cycle:
//! - [`index`] - Normalizing address objects into matchable subnets
//! - [`matcher`] - Longest-prefix matching and per-subnet aggregation
//! - [`sessions`] - Per-session gauge passthrough

mod index;
mod matcher;
mod sessions;

// Re-export public functions
pub use index::{build_index, normalize};
pub use matcher::{
    aggregate, find_longest_prefix_match, match_session, AggregateCounter, SubnetKey, SubnetUsage,
};
pub use sessions::{session_gauges, SessionGauge};

use crate::fortigate::Snapshot;
use crate::models::{address_objects, session_records};

/// Everything one poll cycle produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutput {
    pub usage: AggregateCounter,
    pub sessions: Vec<SessionGauge>,
    /// Number of address objects that made it into the index.
    pub indexed_subnets: usize,
}

/// Run the index, matcher and passthrough over one snapshot.
///
/// Builds a fresh index and counter every call; nothing carries over between passes.
pub fn aggregate_pass(snapshot: &Snapshot) -> PassOutput {
    let objects = address_objects(&snapshot.addresses);
    let records = session_records(&snapshot.sessions);

    let index = build_index(&objects);
    let usage = aggregate(&records, &index);

    log::info!(
        "Pass done: {} subnets indexed ({} objects), {} sessions, {} skipped, {} unmatched, {} subnet counters",
        index.len(),
        objects.len(),
        records.len(),
        usage.skipped_sessions,
        usage.unmatched_sessions,
        usage.len()
    );

    PassOutput {
        usage,
        sessions: session_gauges(&records),
        indexed_subnets: index.len(),
    }
}
