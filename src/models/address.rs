//! Firewall address objects as returned by `/api/v2/cmdb/firewall/address`.

use crate::error::UsageError;
use serde::{Deserialize, Serialize};

/// One configured address object inside a VDOM envelope.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FirewallAddressResult {
    /// Object name, unique within its VDOM.
    pub name: String,
    /// `"<ip> <mask>"` for `ipmask` objects, absent for fqdn/iprange/geography.
    #[serde(default)]
    pub subnet: String,
    /// Address type (`ipmask`, `iprange`, `fqdn`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Per-VDOM response envelope.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FirewallAddressData {
    #[serde(default)]
    pub results: Vec<FirewallAddressResult>,
    #[serde(default)]
    pub vdom: String,
}

/// A configured subnet scoped to its administrative domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressObject {
    pub name: String,
    /// Raw `"<ip> <mask>"` string.
    pub subnet: String,
    pub domain: String,
}

impl AddressObject {
    pub fn new(name: &str, subnet: &str, domain: &str) -> AddressObject {
        AddressObject {
            name: name.to_string(),
            subnet: subnet.to_string(),
            domain: domain.to_string(),
        }
    }

    /// Split `subnet` on single spaces into (address, mask).
    ///
    /// Anything other than exactly two tokens is a [`UsageError::MalformedSubnetFormat`],
    /// so a doubled space or CIDR notation is rejected.
    pub fn split_subnet(&self) -> Result<(&str, &str), UsageError> {
        let tokens: Vec<&str> = self.subnet.split(' ').collect();
        match tokens.as_slice() {
            [address, mask] => Ok((*address, *mask)),
            _ => Err(UsageError::MalformedSubnetFormat(self.subnet.clone())),
        }
    }
}

/// Flatten per-VDOM envelopes into address objects, in response order.
pub fn address_objects(data: &[FirewallAddressData]) -> Vec<AddressObject> {
    data.iter()
        .flat_map(|vdom_data| {
            vdom_data
                .results
                .iter()
                .map(move |r| AddressObject::new(&r.name, &r.subnet, &vdom_data.vdom))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_subnet() {
        let obj = AddressObject::new("lan", "10.0.0.0 255.255.255.0", "root");
        assert_eq!(obj.split_subnet().unwrap(), ("10.0.0.0", "255.255.255.0"));

        for bad in ["10.0.0.0/24", "", "10.0.0.0  255.0.0.0", "a b c"] {
            let obj = AddressObject::new("bad", bad, "root");
            assert!(
                matches!(obj.split_subnet(), Err(UsageError::MalformedSubnetFormat(_))),
                "'{bad}' should be malformed"
            );
        }
    }

    #[test]
    fn test_address_objects_flatten() {
        let json = r#"[
            {"vdom": "root", "results": [
                {"name": "lan", "subnet": "10.0.0.0 255.255.255.0", "type": "ipmask"},
                {"name": "portal", "type": "fqdn", "fqdn": "portal.example.net"}
            ]},
            {"vdom": "guest", "results": [
                {"name": "wifi", "subnet": "172.16.0.0 255.255.0.0", "type": "ipmask"}
            ]}
        ]"#;
        let data: Vec<FirewallAddressData> = serde_json::from_str(json).unwrap();
        let objects = address_objects(&data);
        assert_eq!(objects.len(), 3);
        assert_eq!(objects[0], AddressObject::new("lan", "10.0.0.0 255.255.255.0", "root"));
        assert_eq!(objects[1].subnet, "", "fqdn objects carry no subnet");
        assert_eq!(objects[2].domain, "guest");
    }
}
