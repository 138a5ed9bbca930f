//! Domain models for the FortiGate subnet usage exporter.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Ipv4`] - IPv4 network with prefix length
//! - [`FirewallAddressData`] and [`AddressObject`] - configured address objects
//! - [`UserFirewall`] and [`SessionRecord`] - active user-firewall sessions
//! - [`NormalizedSubnet`] - address object in matchable form

mod address;
mod ipv4;
mod session;
mod subnet;

// Re-export public types
pub use address::{address_objects, AddressObject, FirewallAddressData, FirewallAddressResult};
pub use ipv4::{
    as_ipv4, broadcast_addr, cut_addr, get_cidr_mask, prefix_len_from_mask, Ipv4, MAX_LENGTH,
};
pub use session::{session_records, SessionRecord, UserFirewall, UserFirewallResult};
pub use subnet::NormalizedSubnet;
