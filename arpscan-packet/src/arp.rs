//! ARP Packet Structure and Parsing
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      Hardware Type (HTYPE)    |       Protocol Type (PTYPE)   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  HW Addr Len  |Proto Addr Len |         Operation (OPER)      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                   Sender Hardware Address (SHA)               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |       SHA (cont.)             |  Sender Protocol Address (SPA)|
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |       SPA (cont.)             |  Target Hardware Address (THA)|
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                        THA (cont.)                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                   Target Protocol Address (TPA)               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use arpscan_core::{Error, MacAddr, Result};
use bytes::{BufMut, BytesMut};
use std::net::Ipv4Addr;

/// Hardware types
pub const HTYPE_ETHERNET: u16 = 1;

/// Protocol types
pub const PTYPE_IPV4: u16 = 0x0800;

/// Hardware address length for Ethernet
pub const HLEN_ETHERNET: u8 = 6;

/// Protocol address length for IPv4
pub const PLEN_IPV4: u8 = 4;

/// Size of an Ethernet/IPv4 ARP packet
pub const ARP_PACKET_LEN: usize = 28;

/// ARP Operation Codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOpcode {
    /// ARP Request
    Request = 1,
    /// ARP Reply
    Reply = 2,
}

impl ArpOpcode {
    pub fn from_u16(val: u16) -> Option<Self> {
        match val {
            1 => Some(Self::Request),
            2 => Some(Self::Reply),
            _ => None,
        }
    }
}

/// ARP Packet (Ethernet hardware, IPv4 protocol)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpPacket {
    /// Operation
    pub operation: ArpOpcode,
    /// Sender hardware address (MAC)
    pub sender_hw_addr: MacAddr,
    /// Sender protocol address (IP)
    pub sender_proto_addr: Ipv4Addr,
    /// Target hardware address (MAC)
    pub target_hw_addr: MacAddr,
    /// Target protocol address (IP)
    pub target_proto_addr: Ipv4Addr,
}

impl ArpPacket {
    /// Create new ARP request; the target hardware address is unknown and left zero
    pub fn new_request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        Self {
            operation: ArpOpcode::Request,
            sender_hw_addr: sender_mac,
            sender_proto_addr: sender_ip,
            target_hw_addr: MacAddr::zero(),
            target_proto_addr: target_ip,
        }
    }

    /// Create new ARP reply
    pub fn new_reply(
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    ) -> Self {
        Self {
            operation: ArpOpcode::Reply,
            sender_hw_addr: sender_mac,
            sender_proto_addr: sender_ip,
            target_hw_addr: target_mac,
            target_proto_addr: target_ip,
        }
    }

    /// Parse ARP packet from bytes
    ///
    /// Only Ethernet/IPv4 ARP is accepted; trailing padding is ignored.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < ARP_PACKET_LEN {
            return Err(Error::parsing(format!(
                "ARP packet too short: {} bytes",
                data.len()
            )));
        }

        let htype = u16::from_be_bytes([data[0], data[1]]);
        let ptype = u16::from_be_bytes([data[2], data[3]]);
        let hlen = data[4];
        let plen = data[5];
        if htype != HTYPE_ETHERNET || ptype != PTYPE_IPV4 {
            return Err(Error::parsing(format!(
                "unsupported ARP hardware/protocol type {:#06x}/{:#06x}",
                htype, ptype
            )));
        }
        if hlen != HLEN_ETHERNET || plen != PLEN_IPV4 {
            return Err(Error::parsing(format!(
                "unexpected ARP address lengths {}/{}",
                hlen, plen
            )));
        }

        let op_val = u16::from_be_bytes([data[6], data[7]]);
        let operation = ArpOpcode::from_u16(op_val)
            .ok_or_else(|| Error::parsing(format!("Invalid ARP opcode {}", op_val)))?;

        let sender_hw_addr = MacAddr::from_slice(&data[8..14])
            .ok_or_else(|| Error::parsing("bad sender hardware address"))?;
        let sender_proto_addr = Ipv4Addr::new(data[14], data[15], data[16], data[17]);
        let target_hw_addr = MacAddr::from_slice(&data[18..24])
            .ok_or_else(|| Error::parsing("bad target hardware address"))?;
        let target_proto_addr = Ipv4Addr::new(data[24], data[25], data[26], data[27]);

        Ok(Self {
            operation,
            sender_hw_addr,
            sender_proto_addr,
            target_hw_addr,
            target_proto_addr,
        })
    }

    /// Serialize ARP packet to bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(ARP_PACKET_LEN);

        buf.put_u16(HTYPE_ETHERNET);
        buf.put_u16(PTYPE_IPV4);
        buf.put_u8(HLEN_ETHERNET);
        buf.put_u8(PLEN_IPV4);
        buf.put_u16(self.operation as u16);
        buf.put_slice(self.sender_hw_addr.as_bytes());
        buf.put_slice(&self.sender_proto_addr.octets());
        buf.put_slice(self.target_hw_addr.as_bytes());
        buf.put_slice(&self.target_proto_addr.octets());

        buf.to_vec()
    }

    /// Check if this is a request
    pub fn is_request(&self) -> bool {
        self.operation == ArpOpcode::Request
    }

    /// Check if this is a reply
    pub fn is_reply(&self) -> bool {
        self.operation == ArpOpcode::Reply
    }

    /// A reply that names a real sender: non-zero hardware address
    pub fn is_well_formed_reply(&self) -> bool {
        self.is_reply() && !self.sender_hw_addr.is_zero()
    }
}
