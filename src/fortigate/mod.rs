//! FortiGate API interaction.
//!
//! This module handles everything that talks to the appliance:
//! - [`client`] - REST calls and response decoding
//! - [`snapshot`] - Snapshot files and per-cycle data loading

mod client;
mod snapshot;

// Re-export public types and functions
pub use client::{decode_response, FortiClient, FIREWALL_ADDRESS_PATH, USER_FIREWALL_PATH};
pub use snapshot::{load_snapshot, read_snapshot, snapshot_file_name, write_snapshot, Snapshot};
