//! Packet construction and parsing library for arpscan
//!
//! This crate covers the two frame types an ARP sweep needs:
//!
//! - **Ethernet II frames**, with 802.1Q tag handling when parsing
//! - **ARP** packets for Ethernet/IPv4
//!
//! # Quick Start
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use arpscan_core::MacAddr;
//! use arpscan_packet::{build_request_frame, decode_arp};
//!
//! let src = MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
//! let frame = build_request_frame(src, Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 7));
//!
//! let arp = decode_arp(&frame).unwrap().unwrap();
//! assert!(arp.is_request());
//! ```

pub mod arp;
pub mod codec;
pub mod ethernet;

// Re-export commonly used types for convenience
pub use arp::{ArpOpcode, ArpPacket};
pub use codec::{build_request_frame, decode_arp};
pub use ethernet::{EtherType, EthernetFrame, EthernetHeader};
