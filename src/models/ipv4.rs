//! IPv4 network and prefix-length utilities.
//!
//! Provides [`Ipv4`] for a network address with its prefix length, along with
//! the mask conversions used when normalizing firewall address objects.

use crate::error::UsageError;
use std::net::{IpAddr, Ipv4Addr};

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use fortigate_subnet_usage::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, UsageError> {
    if len > MAX_LENGTH {
        return Err(UsageError::InvalidMaskFormat(format!("/{len}")));
    }
    // A shift by 32 overflows, /0 is the empty mask.
    Ok(u32::MAX
        .checked_shl(u32::from(MAX_LENGTH - len))
        .unwrap_or(0))
}

/// Count the leading one-bits of a dotted-quad mask.
///
/// Contiguity is not checked: `255.0.255.0` counts as /8.
pub fn prefix_len_from_mask(mask: Ipv4Addr) -> u8 {
    u32::from(mask).leading_ones() as u8
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, UsageError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Calculate the broadcast address for a given IP and prefix length.
pub fn broadcast_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, UsageError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from((u32::from(addr) & mask) | !mask))
}

/// Reduce a session address to IPv4 for matching.
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are unwrapped, any other
/// IPv6 address has no IPv4 form and matches nothing.
pub fn as_ipv4(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

/// IPv4 network with CIDR prefix length.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    /// The network address, host bits cleared.
    pub addr: Ipv4Addr,
    /// The prefix length (0-32).
    pub mask: u8,
}

impl Ipv4 {
    /// Create a new [`Ipv4`] from a CIDR string (e.g., "10.0.0.0/24").
    ///
    /// Host bits are cleared, so "10.0.0.7/24" becomes 10.0.0.0/24. Address
    /// objects arrive as `"<ip> <mask>"` and go through `from_prefix` instead.
    #[cfg(test)]
    pub fn new(addr_cidr: &str) -> Result<Ipv4, UsageError> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| UsageError::MalformedSubnetFormat(addr_cidr.to_string()))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| UsageError::InvalidAddressFormat(addr.to_string()))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| UsageError::InvalidMaskFormat(mask.to_string()))?;
        Ipv4::from_prefix(addr, mask)
    }

    /// Build a network from any address inside it and a prefix length.
    pub fn from_prefix(addr: Ipv4Addr, mask: u8) -> Result<Ipv4, UsageError> {
        Ok(Ipv4 {
            addr: cut_addr(addr, mask)?,
            mask,
        })
    }

    /// True if the first `mask` bits of `ip` equal the network bits.
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        // mask is <= 32 by construction
        let net_mask = get_cidr_mask(self.mask).unwrap_or(u32::MAX);
        u32::from(ip) & net_mask == u32::from(self.addr) & net_mask
    }

    /// Get the highest (broadcast) address in the subnet.
    pub fn hi(&self) -> Ipv4Addr {
        broadcast_addr(self.addr, self.mask).unwrap_or(self.addr)
    }
}

impl std::fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
