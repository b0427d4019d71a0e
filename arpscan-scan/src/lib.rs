//! ARP scan engine for arpscan
//!
//! This crate ties the codec and the raw link together into a bounded scan:
//!
//! - [`Transmitter`] writes one ARP request per host address, `repeat` times
//! - [`Receiver`] reads the link on a blocking thread and forwards foreign replies
//! - [`Collector`] runs one interface: validate, probe, drain until the wait
//!   window closes, deduplicate, filter, resolve and report
//! - [`Scanner`] fans the collector out across interfaces
//!
//! Name lookup and output are pluggable through [`NameResolver`] and [`Reporter`].
//!
//! ## Example
//!
//! ```no_run
//! use arpscan_capture::{list_interfaces, DatalinkOpener};
//! use arpscan_scan::{ConsoleReporter, HwFilter, ScanConfig, Scanner};
//! use std::sync::Arc;
//!
//! # async fn run() -> arpscan_core::Result<()> {
//! let config = ScanConfig::default().with_filter(HwFilter::raspberry_pi());
//! let scanner = Scanner::new(
//!     config,
//!     Arc::new(DatalinkOpener::default()),
//!     Arc::new(ConsoleReporter),
//! )?;
//!
//! for result in scanner.run(list_interfaces()?).await {
//!     println!("{}: {:?}", result.interface, result.result.is_ok());
//! }
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod orchestrator;
pub mod receiver;
pub mod report;
pub mod resolver;
pub mod transmitter;

pub use collector::{Collector, ScanOutcome, ScanSummary, SkipReason};
pub use config::{HwFilter, ScanConfig, RASPBERRY_PI_OUI};
pub use orchestrator::{InterfaceResult, Scanner};
pub use receiver::{Receiver, StopSignal, Verdict};
pub use report::{error_line, ConsoleReporter, ReplyRecord, Reporter};
pub use resolver::{DigResolver, MdnsResolver, NameResolver};
pub use transmitter::Transmitter;
