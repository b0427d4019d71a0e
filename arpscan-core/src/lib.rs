//! arpscan Core Library
//!
//! This crate provides the fundamental types, error handling and subnet
//! arithmetic shared by the arpscan crates.

pub mod error;
pub mod interface;
pub mod subnet;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use interface::Interface;
pub use ipnetwork::Ipv4Network;
pub use subnet::{host_addresses, host_count, validate_scan_network, MAX_SCAN_HOSTS};
pub use types::MacAddr;
