//! Network interface enumeration

use arpscan_core::{Error, Interface, MacAddr, Result};
use ipnetwork::IpNetwork;
use pnet_datalink::{self, NetworkInterface};

/// Convert a pnet interface into an arpscan descriptor, keeping only IPv4 networks
pub fn describe(iface: &NetworkInterface) -> Interface {
    let mac_address = iface
        .mac
        .map(|mac| MacAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]));

    let ipv4 = iface
        .ips
        .iter()
        .filter_map(|network| match network {
            IpNetwork::V4(v4) => Some(*v4),
            IpNetwork::V6(_) => None,
        })
        .collect();

    Interface {
        name: iface.name.clone(),
        index: iface.index,
        mac_address,
        ipv4,
        is_up: iface.is_up(),
        is_loopback: iface.is_loopback(),
    }
}

/// List all network interfaces
pub fn list_interfaces() -> Result<Vec<Interface>> {
    let interfaces = pnet_datalink::interfaces();

    if interfaces.is_empty() {
        return Err(Error::Interface(
            "No network interfaces found. Are you running with sufficient privileges?".to_string(),
        ));
    }

    Ok(interfaces.iter().map(describe).collect())
}

/// Find the pnet interface backing a descriptor
pub(crate) fn find_by_name(name: &str) -> Result<NetworkInterface> {
    pnet_datalink::interfaces()
        .into_iter()
        .find(|iface| iface.name == name)
        .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
}

/// Keep only the named interfaces, failing on any name that does not exist
pub fn select_interfaces(all: Vec<Interface>, names: &[String]) -> Result<Vec<Interface>> {
    if names.is_empty() {
        return Ok(all);
    }

    if let Some(missing) = names.iter().find(|n| !all.iter().any(|i| &i.name == *n)) {
        return Err(Error::InterfaceNotFound(missing.clone()));
    }

    Ok(all
        .into_iter()
        .filter(|iface| names.contains(&iface.name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipnetwork::{Ipv4Network, Ipv6Network};
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_list_interfaces() {
        let result = list_interfaces();
        // Should at least have loopback
        assert!(result.is_ok());
        let interfaces = result.unwrap();
        assert!(!interfaces.is_empty());
        for iface in interfaces {
            assert!(!iface.name.is_empty());
        }
    }

    #[test]
    fn test_get_nonexistent_interface() {
        match find_by_name("nonexistent_interface_xyz") {
            Err(Error::InterfaceNotFound(_)) => {}
            _ => panic!("Expected InterfaceNotFound error"),
        }
    }

    #[test]
    fn test_describe_keeps_ipv4_only() {
        let pnet_iface = NetworkInterface {
            name: "eth7".to_string(),
            description: String::new(),
            index: 7,
            mac: Some(pnet_datalink::MacAddr(0xb8, 0x27, 0xeb, 1, 2, 3)),
            ips: vec![
                IpNetwork::V6(Ipv6Network::new(Ipv6Addr::LOCALHOST, 128).unwrap()),
                IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 5), 24).unwrap()),
            ],
            flags: 0,
        };

        let iface = describe(&pnet_iface);
        assert_eq!(iface.name, "eth7");
        assert_eq!(iface.mac_address, Some(MacAddr([0xb8, 0x27, 0xeb, 1, 2, 3])));
        assert_eq!(iface.ipv4.len(), 1);
        assert_eq!(iface.ipv4[0].ip(), Ipv4Addr::new(10, 0, 0, 5));
        assert!(!iface.is_up);
    }

    #[test]
    fn test_select_interfaces() {
        let all = vec![
            Interface::new("eth0", 1, None),
            Interface::new("wlan0", 2, None),
        ];

        let picked = select_interfaces(all.clone(), &["wlan0".to_string()]).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "wlan0");

        assert_eq!(select_interfaces(all.clone(), &[]).unwrap().len(), 2);
        assert!(matches!(
            select_interfaces(all, &["eth9".to_string()]),
            Err(Error::InterfaceNotFound(_))
        ));
    }
}
