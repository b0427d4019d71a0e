//! Ethernet frame construction and parsing
//!
//! This module provides functionality for building and parsing Ethernet II frames,
//! with optional single 802.1Q tag handling on the parse side.

use arpscan_core::{Error, MacAddr, Result};
use bytes::{BufMut, BytesMut};
use std::fmt;

/// EtherType values arpscan cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    /// IPv4 (0x0800)
    IPv4,
    /// ARP (0x0806)
    ARP,
    /// VLAN-tagged frame (0x8100)
    VLAN,
    /// IPv6 (0x86DD)
    IPv6,
    /// Any other EtherType
    Custom(u16),
}

impl EtherType {
    /// Convert EtherType to u16 value
    pub fn to_u16(self) -> u16 {
        match self {
            EtherType::IPv4 => 0x0800,
            EtherType::ARP => 0x0806,
            EtherType::VLAN => 0x8100,
            EtherType::IPv6 => 0x86DD,
            EtherType::Custom(val) => val,
        }
    }

    /// Create EtherType from u16 value
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0800 => EtherType::IPv4,
            0x0806 => EtherType::ARP,
            0x8100 => EtherType::VLAN,
            0x86DD => EtherType::IPv6,
            val => EtherType::Custom(val),
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::IPv4 => write!(f, "IPv4"),
            EtherType::ARP => write!(f, "ARP"),
            EtherType::VLAN => write!(f, "VLAN"),
            EtherType::IPv6 => write!(f, "IPv6"),
            EtherType::Custom(val) => write!(f, "0x{:04X}", val),
        }
    }
}

/// Ethernet II frame to be put on the wire
#[derive(Debug, Clone)]
pub struct EthernetFrame {
    /// Destination MAC address
    pub destination: MacAddr,
    /// Source MAC address
    pub source: MacAddr,
    /// EtherType
    pub ethertype: EtherType,
    /// Payload data
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    /// Minimum Ethernet frame size (without FCS)
    pub const MIN_FRAME_SIZE: usize = 60;

    /// Ethernet header size (dst + src + type)
    pub const HEADER_SIZE: usize = 14;

    /// Size of a single 802.1Q tag
    pub const VLAN_TAG_SIZE: usize = 4;

    /// Create a new Ethernet frame
    pub fn new(
        destination: MacAddr,
        source: MacAddr,
        ethertype: EtherType,
        payload: Vec<u8>,
    ) -> Self {
        EthernetFrame {
            destination,
            source,
            ethertype,
            payload,
        }
    }

    /// Convert the frame to bytes
    ///
    /// Frames shorter than the Ethernet minimum are zero-padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(Self::MIN_FRAME_SIZE.max(self.len()));

        buffer.put_slice(self.destination.as_bytes());
        buffer.put_slice(self.source.as_bytes());
        buffer.put_u16(self.ethertype.to_u16());
        buffer.put_slice(&self.payload);

        let mut result = buffer.to_vec();
        if result.len() < Self::MIN_FRAME_SIZE {
            result.resize(Self::MIN_FRAME_SIZE, 0);
        }

        result
    }

    /// Total frame size in bytes, padding included
    fn len(&self) -> usize {
        let raw_len = Self::HEADER_SIZE + self.payload.len();
        raw_len.max(Self::MIN_FRAME_SIZE)
    }
}

/// Parsed Ethernet II header of a captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    /// Destination MAC address
    pub destination: MacAddr,
    /// Source MAC address
    pub source: MacAddr,
    /// EtherType of the payload (inner type when tagged)
    pub ethertype: EtherType,
    /// 802.1Q VLAN id, when the frame carried a tag
    pub vlan_id: Option<u16>,
}

impl EthernetHeader {
    /// Parse the header of a captured frame, returning it with the payload slice
    pub fn parse(data: &[u8]) -> Result<(Self, &[u8])> {
        if data.len() < EthernetFrame::HEADER_SIZE {
            return Err(Error::parsing(format!(
                "Ethernet frame too short: {} bytes",
                data.len()
            )));
        }

        let destination = MacAddr::from_slice(&data[0..6])
            .ok_or_else(|| Error::parsing("bad destination address"))?;
        let source = MacAddr::from_slice(&data[6..12])
            .ok_or_else(|| Error::parsing("bad source address"))?;

        let ethertype = EtherType::from_u16(u16::from_be_bytes([data[12], data[13]]));
        if ethertype != EtherType::VLAN {
            let header = EthernetHeader {
                destination,
                source,
                ethertype,
                vlan_id: None,
            };
            return Ok((header, &data[EthernetFrame::HEADER_SIZE..]));
        }

        let tagged_len = EthernetFrame::HEADER_SIZE + EthernetFrame::VLAN_TAG_SIZE;
        if data.len() < tagged_len {
            return Err(Error::parsing("802.1Q tag truncated"));
        }
        let tci = u16::from_be_bytes([data[14], data[15]]);
        let inner = EtherType::from_u16(u16::from_be_bytes([data[16], data[17]]));

        let header = EthernetHeader {
            destination,
            source,
            ethertype: inner,
            vlan_id: Some(tci & 0x0fff),
        };
        Ok((header, &data[tagged_len..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ethertype_conversion() {
        assert_eq!(EtherType::IPv4.to_u16(), 0x0800);
        assert_eq!(EtherType::ARP.to_u16(), 0x0806);
        assert_eq!(EtherType::from_u16(0x0806), EtherType::ARP);
        assert_eq!(EtherType::from_u16(0x88CC), EtherType::Custom(0x88CC));
    }

    #[test]
    fn test_ethernet_frame_to_bytes() {
        let src = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let dst = MacAddr::broadcast();
        let payload = vec![0x01, 0x02, 0x03, 0x04];

        let frame = EthernetFrame::new(dst, src, EtherType::ARP, payload);
        let bytes = frame.to_bytes();

        assert_eq!(bytes.len(), EthernetFrame::MIN_FRAME_SIZE);
        assert_eq!(&bytes[0..6], dst.as_bytes());
        assert_eq!(&bytes[6..12], src.as_bytes());
        assert_eq!(u16::from_be_bytes([bytes[12], bytes[13]]), 0x0806);
        assert_eq!(&bytes[14..18], &[0x01, 0x02, 0x03, 0x04]);
        assert!(bytes[18..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_header_parse() {
        let data = vec![
            0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, // dst
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // src
            0x08, 0x00, // IPv4
            0x01, 0x02, 0x03, 0x04, // payload
        ];

        let (header, payload) = EthernetHeader::parse(&data).unwrap();
        assert_eq!(header.destination.0, [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(header.source.0, [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(header.ethertype, EtherType::IPv4);
        assert_eq!(header.vlan_id, None);
        assert_eq!(payload, &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_header_parse_vlan_tagged() {
        let data = vec![
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // dst
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // src
            0x81, 0x00, 0x20, 0x0A, // 802.1Q, prio 1, vid 10
            0x08, 0x06, // ARP
            0xDE, 0xAD,
        ];

        let (header, payload) = EthernetHeader::parse(&data).unwrap();
        assert_eq!(header.ethertype, EtherType::ARP);
        assert_eq!(header.vlan_id, Some(10));
        assert_eq!(payload, &[0xDE, 0xAD]);
    }

    #[test]
    fn test_header_parse_truncated() {
        assert!(EthernetHeader::parse(&[0u8; 13]).is_err());
        let mut tagged = vec![0u8; 12];
        tagged.extend_from_slice(&[0x81, 0x00, 0x00]);
        assert!(EthernetHeader::parse(&tagged).is_err());
    }
}
