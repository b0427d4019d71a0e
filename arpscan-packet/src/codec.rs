//! Probe frame construction and captured frame decoding

use crate::arp::ArpPacket;
use crate::ethernet::{EtherType, EthernetFrame, EthernetHeader};
use arpscan_core::{MacAddr, Result};
use std::net::Ipv4Addr;

/// Build the wire bytes of a broadcast ARP request asking who has `target_ip`.
pub fn build_request_frame(
    sender_mac: MacAddr,
    sender_ip: Ipv4Addr,
    target_ip: Ipv4Addr,
) -> Vec<u8> {
    let arp = ArpPacket::new_request(sender_mac, sender_ip, target_ip);
    EthernetFrame::new(
        MacAddr::broadcast(),
        sender_mac,
        EtherType::ARP,
        arp.serialize(),
    )
    .to_bytes()
}

/// Decode a captured frame.
///
/// Returns `Ok(None)` when the frame is not ARP, and an error when the frame
/// is truncated or carries a malformed ARP header.
pub fn decode_arp(data: &[u8]) -> Result<Option<ArpPacket>> {
    let (header, payload) = EthernetHeader::parse(data)?;
    if header.ethertype != EtherType::ARP {
        return Ok(None);
    }
    ArpPacket::parse(payload).map(Some)
}
