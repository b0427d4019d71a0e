//! Network interface descriptor

use crate::MacAddr;
use ipnetwork::Ipv4Network;
use std::fmt;

/// A network interface as seen at scan start.
///
/// Built once per discovered interface and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Interface name (e.g., "eth0", "en0")
    pub name: String,
    /// Interface index
    pub index: u32,
    /// MAC address, if the interface has one
    pub mac_address: Option<MacAddr>,
    /// IPv4 networks bound to the interface, in OS order
    pub ipv4: Vec<Ipv4Network>,
    /// Is interface up?
    pub is_up: bool,
    /// Is this a loopback interface?
    pub is_loopback: bool,
}

impl Interface {
    /// Create a new interface with no addresses
    pub fn new(name: impl Into<String>, index: u32, mac_address: Option<MacAddr>) -> Self {
        Self {
            name: name.into(),
            index,
            mac_address,
            ipv4: Vec::new(),
            is_up: true,
            is_loopback: false,
        }
    }

    /// Add a bound IPv4 network
    pub fn with_ipv4(mut self, network: Ipv4Network) -> Self {
        self.ipv4.push(network);
        self
    }

    /// The first IPv4 network bound to this interface
    pub fn first_ipv4(&self) -> Option<Ipv4Network> {
        self.ipv4.first().copied()
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match self.mac_address {
            Some(mac) => write!(f, " ({})", mac)?,
            None => write!(f, " (no mac)")?,
        }
        for net in &self.ipv4 {
            write!(f, " {}", net)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_first_ipv4() {
        let iface = Interface::new("eth0", 2, Some(MacAddr([0, 0x11, 0x22, 0x33, 0x44, 0x55])));
        assert!(iface.first_ipv4().is_none());

        let a = Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 5), 24).unwrap();
        let b = Ipv4Network::new(Ipv4Addr::new(192, 168, 7, 1), 24).unwrap();
        let iface = iface.with_ipv4(a).with_ipv4(b);
        assert_eq!(iface.first_ipv4(), Some(a));
    }

    #[test]
    fn test_display() {
        let iface = Interface::new("eth0", 2, Some(MacAddr([0, 0x11, 0x22, 0x33, 0x44, 0x55])))
            .with_ipv4(Ipv4Network::new(Ipv4Addr::new(10, 0, 0, 5), 24).unwrap());
        assert_eq!(iface.to_string(), "eth0 (00:11:22:33:44:55) 10.0.0.5/24");
        assert_eq!(Interface::new("tun0", 9, None).to_string(), "tun0 (no mac)");
    }
}
