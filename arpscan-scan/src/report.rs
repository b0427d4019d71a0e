//! Result records and where they are written

use arpscan_core::{Error, MacAddr};
use std::fmt;
use std::io::{self, Write};
use std::net::Ipv4Addr;

/// One unique responder seen during an interface scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRecord {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
    /// Resolved display name; `None` when no resolver ran or the lookup failed
    pub name: Option<String>,
}

impl ReplyRecord {
    pub fn new(ip: Ipv4Addr, mac: MacAddr) -> Self {
        Self { ip, mac, name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for ReplyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IP {} ({}) is at {}",
            self.ip,
            self.name.as_deref().unwrap_or(""),
            self.mac
        )
    }
}

/// Receives scan results as they are produced
pub trait Reporter: Send + Sync {
    /// A unique responder passed the filter
    fn report(&self, interface: &str, record: &ReplyRecord);

    /// An interface-level scan failed
    fn report_error(&self, interface: &str, error: &Error);
}

/// Writes records to stdout and interface failures to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, _interface: &str, record: &ReplyRecord) {
        // stdout may be a closed pipe; nothing useful to do about it here
        let _ = writeln!(io::stdout().lock(), "{}", record);
    }

    fn report_error(&self, interface: &str, error: &Error) {
        let _ = writeln!(io::stderr().lock(), "{}", error_line(interface, error));
    }
}

/// The line printed for a failed interface
pub fn error_line(interface: &str, error: &Error) -> String {
    format!("interface {}: {}", interface, error)
}
