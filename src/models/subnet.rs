//! Normalized subnet used for matching.

use super::Ipv4;

/// An address object reduced to network/prefix form. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSubnet {
    pub name: String,
    pub domain: String,
    pub network: Ipv4,
}

impl NormalizedSubnet {
    pub fn prefix_len(&self) -> u8 {
        self.network.mask
    }
}
