//! Subnet index construction.
//!
//! Turns the configured address objects into [`NormalizedSubnet`]s. Objects that
//! cannot be normalized are logged and left out for this poll cycle.

use crate::error::UsageError;
use crate::models::{prefix_len_from_mask, AddressObject, Ipv4, NormalizedSubnet};
use std::net::Ipv4Addr;

/// Normalize a dotted-quad address and mask into network/prefix form.
///
/// The prefix length is the count of leading one-bits in the mask; the mask is
/// trusted and not checked for contiguity.
///
/// # Examples
/// ```
/// use fortigate_subnet_usage::processing::normalize;
/// let net = normalize("10.0.0.0", "255.255.255.0").unwrap();
/// assert_eq!(net.to_string(), "10.0.0.0/24");
/// ```
pub fn normalize(address: &str, mask: &str) -> Result<Ipv4, UsageError> {
    let addr: Ipv4Addr = address
        .parse()
        .map_err(|_| UsageError::InvalidAddressFormat(address.to_string()))?;
    let mask: Ipv4Addr = mask
        .parse()
        .map_err(|_| UsageError::InvalidMaskFormat(mask.to_string()))?;
    Ipv4::from_prefix(addr, prefix_len_from_mask(mask))
}

fn normalize_object(object: &AddressObject) -> Result<NormalizedSubnet, UsageError> {
    let (address, mask) = object.split_subnet()?;
    Ok(NormalizedSubnet {
        name: object.name.clone(),
        domain: object.domain.clone(),
        network: normalize(address, mask)?,
    })
}

/// Build the list of matchable subnets, preserving input order.
///
/// Never fails: malformed or unparseable objects are skipped with a warning.
pub fn build_index(objects: &[AddressObject]) -> Vec<NormalizedSubnet> {
    let index: Vec<NormalizedSubnet> = objects
        .iter()
        .filter_map(|object| match normalize_object(object) {
            Ok(subnet) => {
                log::trace!(
                    "indexed '{}' vdom='{}' as {}",
                    subnet.name,
                    subnet.domain,
                    subnet.network
                );
                Some(subnet)
            }
            Err(e) => {
                log::warn!(
                    "Skipping address '{}' vdom='{}': {e}",
                    object.name,
                    object.domain
                );
                None
            }
        })
        .collect();

    log::debug!(
        "Subnet index built: {} of {} address objects usable",
        index.len(),
        objects.len()
    );
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let net = normalize("10.0.0.0", "255.255.255.0").unwrap();
        assert_eq!(net.addr, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(net.mask, 24);

        // host bits in the configured address are dropped
        let net = normalize("192.168.10.77", "255.255.255.128").unwrap();
        assert_eq!(net.to_string(), "192.168.10.0/25");

        let net = normalize("0.0.0.0", "0.0.0.0").unwrap();
        assert_eq!(net.to_string(), "0.0.0.0/0");

        let net = normalize("10.1.2.3", "255.0.255.0").unwrap();
        assert_eq!(net.to_string(), "10.0.0.0/8", "non-contiguous mask counts leading ones");
    }

    #[test]
    fn test_normalize_errors() {
        assert!(matches!(
            normalize("10.0.0.256", "255.255.255.0"),
            Err(UsageError::InvalidAddressFormat(_))
        ));
        assert!(matches!(
            normalize("fe80::1", "255.255.255.0"),
            Err(UsageError::InvalidAddressFormat(_))
        ));
        assert!(matches!(
            normalize("10.0.0.0", "24"),
            Err(UsageError::InvalidMaskFormat(_))
        ));
    }

    #[test]
    fn test_build_index_skips_bad_objects() {
        let objects = vec![
            AddressObject::new("net-a", "10.0.0.0 255.255.255.0", "root"),
            AddressObject::new("cidr", "10.0.0.0/24", "root"),
            AddressObject::new("fqdn", "", "root"),
            AddressObject::new("bad-ip", "10.0.0.300 255.255.255.0", "root"),
            AddressObject::new("bad-mask", "10.0.0.0 255.255.255", "root"),
            AddressObject::new("net-b", "172.16.0.0 255.255.0.0", "guest"),
        ];
        let index = build_index(&objects);
        assert_eq!(index.len(), 2, "only well-formed objects are indexed");
        assert_eq!(index[0].name, "net-a");
        assert_eq!(index[0].prefix_len(), 24);
        assert_eq!(index[1].name, "net-b");
        assert_eq!(index[1].domain, "guest");
        assert_eq!(index[1].network.to_string(), "172.16.0.0/16");
    }

    #[test]
    fn test_build_index_empty() {
        assert!(build_index(&[]).is_empty());
    }
}
