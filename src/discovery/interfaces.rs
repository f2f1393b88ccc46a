//! Local network interface enumeration
//!
//! Produces the device's active IPv4 addresses and the /24 subnet prefixes
//! the camera could be sitting on.

use super::DiscoveryError;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// One IPv4 address bound to a local interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceAddress {
    pub ip_address: Ipv4Addr,
    pub interface_name: String,
    /// First three octets, e.g. `192.168.43`
    pub subnet_prefix: String,
}

impl NetworkInterfaceAddress {
    pub fn new(interface_name: impl Into<String>, ip_address: Ipv4Addr) -> Self {
        Self {
            ip_address,
            interface_name: interface_name.into(),
            subnet_prefix: subnet_prefix(ip_address),
        }
    }
}

/// First three octets of an address as a dotted string
pub fn subnet_prefix(ip: Ipv4Addr) -> String {
    let [a, b, c, _] = ip.octets();
    format!("{}.{}.{}", a, b, c)
}

/// Source of the device's interface addresses
pub trait InterfaceSource: Send + Sync {
    fn addresses(&self) -> Result<Vec<NetworkInterfaceAddress>, DiscoveryError>;
}

/// Reads interfaces from the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn addresses(&self) -> Result<Vec<NetworkInterfaceAddress>, DiscoveryError> {
        use network_interface::{Addr, NetworkInterface, NetworkInterfaceConfig};

        let interfaces =
            NetworkInterface::show().map_err(|e| DiscoveryError::Interfaces(e.to_string()))?;

        let mut addresses = Vec::new();
        for iface in interfaces {
            for addr in &iface.addr {
                if let Addr::V4(v4) = addr {
                    tracing::debug!("Interface {}: {}", iface.name, v4.ip);
                    if is_usable(v4.ip) {
                        addresses.push(NetworkInterfaceAddress::new(iface.name.clone(), v4.ip));
                    }
                }
            }
        }

        Ok(addresses)
    }
}

/// Fixed address list, for hosts where interface enumeration is done elsewhere
#[derive(Debug, Default, Clone)]
pub struct StaticInterfaces(pub Vec<NetworkInterfaceAddress>);

impl InterfaceSource for StaticInterfaces {
    fn addresses(&self) -> Result<Vec<NetworkInterfaceAddress>, DiscoveryError> {
        Ok(self.0.iter().filter(|a| is_usable(a.ip_address)).cloned().collect())
    }
}

fn is_usable(ip: Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified() && !ip.is_link_local()
}

/// Distinct subnet prefixes, in first-seen order
pub fn candidate_subnets(addresses: &[NetworkInterfaceAddress]) -> Vec<String> {
    let mut subnets: Vec<String> = Vec::new();
    for addr in addresses {
        if !subnets.contains(&addr.subnet_prefix) {
            subnets.push(addr.subnet_prefix.clone());
        }
    }
    subnets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_prefix() {
        assert_eq!(subnet_prefix(Ipv4Addr::new(192, 168, 43, 5)), "192.168.43");
        assert_eq!(subnet_prefix(Ipv4Addr::new(10, 0, 0, 4)), "10.0.0");
    }

    #[test]
    fn test_candidate_subnets_deduplicates() {
        let addrs = vec![
            NetworkInterfaceAddress::new("wlan0", Ipv4Addr::new(192, 168, 43, 5)),
            NetworkInterfaceAddress::new("ap0", Ipv4Addr::new(192, 168, 43, 1)),
            NetworkInterfaceAddress::new("rmnet0", Ipv4Addr::new(10, 12, 7, 9)),
        ];
        assert_eq!(candidate_subnets(&addrs), vec!["192.168.43", "10.12.7"]);
    }

    #[test]
    fn test_static_interfaces_drop_loopback() {
        let source = StaticInterfaces(vec![
            NetworkInterfaceAddress::new("lo", Ipv4Addr::LOCALHOST),
            NetworkInterfaceAddress::new("wlan0", Ipv4Addr::new(192, 168, 43, 5)),
        ]);
        let addrs = source.addresses().unwrap();
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].interface_name, "wlan0");
    }
}
