//! Link access library for arpscan
//!
//! This crate wraps the OS facilities an ARP sweep needs:
//!
//! - **Interface Management**: enumerate interfaces as [`arpscan_core::Interface`] descriptors
//! - **Capture Handles**: one raw Ethernet channel per interface, split into
//!   independent send and receive halves
//! - **Statistics**: thread-safe counters shared between reader and collector
//!
//! ## Example
//!
//! ```no_run
//! use arpscan_capture::{list_interfaces, DatalinkOpener, LinkOpener};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let iface = list_interfaces()?
//!     .into_iter()
//!     .find(|i| !i.is_loopback && i.is_up)
//!     .expect("no interface");
//!
//! let handle = DatalinkOpener::default().open(&iface)?;
//! let (mut sink, mut source) = handle.split();
//! sink.send_frame(&[0u8; 60])?;
//! if let Some(frame) = source.next_frame()? {
//!     println!("Got frame: {} bytes", frame.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod interface;
pub mod stats;

// Re-export main types
pub use capture::{CaptureConfig, CaptureHandle, DatalinkOpener, FrameSink, FrameSource, LinkOpener};
pub use interface::{describe, list_interfaces, select_interfaces};
pub use stats::{CaptureStats, StatsAccumulator};
