//! IPv4 subnet arithmetic: host enumeration and scan-size validation

use crate::{Error, Result};
use ipnetwork::{ipv4_mask_to_prefix, Ipv4Network};
use std::net::Ipv4Addr;

/// Largest number of host addresses a single interface scan will probe (a /24)
pub const MAX_SCAN_HOSTS: u32 = 254;

/// Return every host address strictly between the network and broadcast
/// addresses of `addr`/`mask`, in ascending order.
///
/// The address itself is included; callers that do not want to probe their
/// own address filter it out afterwards.
pub fn host_addresses(addr: Ipv4Addr, mask: Ipv4Addr) -> Result<Vec<Ipv4Addr>> {
    let (network, broadcast) = bounds(addr, mask)?;
    Ok(((network + 1)..broadcast).map(Ipv4Addr::from).collect())
}

/// Number of host addresses in `addr`/`mask` (network and broadcast excluded)
pub fn host_count(addr: Ipv4Addr, mask: Ipv4Addr) -> Result<u32> {
    let (network, broadcast) = bounds(addr, mask)?;
    Ok(broadcast - network - 1)
}

/// Check that a network is small enough for a single scan.
///
/// Networks with more than [`MAX_SCAN_HOSTS`] hosts are rejected rather than
/// truncated.
pub fn validate_scan_network(net: &Ipv4Network) -> Result<()> {
    let hosts = host_count(net.ip(), net.mask())?;
    if hosts > MAX_SCAN_HOSTS {
        return Err(Error::SubnetTooLarge {
            prefix: net.prefix(),
            hosts,
            max: MAX_SCAN_HOSTS,
        });
    }
    Ok(())
}

fn bounds(addr: Ipv4Addr, mask: Ipv4Addr) -> Result<(u32, u32)> {
    let prefix = ipv4_mask_to_prefix(mask)
        .map_err(|_| Error::invalid_subnet(format!("{} is not a contiguous netmask", mask)))?;
    if prefix > 30 {
        return Err(Error::invalid_subnet(format!(
            "/{} network has no host addresses",
            prefix
        )));
    }

    let addr = u32::from(addr);
    let mask = u32::from(mask);
    let network = addr & mask;
    let broadcast = network | !mask;
    Ok((network, broadcast))
}
