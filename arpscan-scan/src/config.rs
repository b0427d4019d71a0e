//! Scan configuration

use arpscan_core::{Error, MacAddr, Result};
use std::time::Duration;

/// Hardware-address prefix assigned to Raspberry Pi boards
pub const RASPBERRY_PI_OUI: &str = "b8:27:eb";

/// Substring filter applied to a responder's hardware address.
///
/// Matching is done against the lowercase `aa:bb:cc:dd:ee:ff` form and is
/// case-insensitive. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HwFilter(String);

impl HwFilter {
    /// Filter that accepts every address
    pub fn any() -> Self {
        Self(String::new())
    }

    /// Filter on a substring of the hardware address
    pub fn new(substring: impl AsRef<str>) -> Self {
        Self(substring.as_ref().trim().to_ascii_lowercase())
    }

    /// Filter selecting Raspberry Pi devices
    pub fn raspberry_pi() -> Self {
        Self::new(RASPBERRY_PI_OUI)
    }

    /// Check a hardware address against the filter
    pub fn matches(&self, mac: &MacAddr) -> bool {
        self.0.is_empty() || mac.to_string().contains(&self.0)
    }

    /// The normalized substring
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Configuration shared by every interface scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// How long to listen for replies after the last probe went out
    pub wait: Duration,
    /// Pause between consecutive probes; zero sends back-to-back
    pub interval: Duration,
    /// Number of passes over the address list
    pub repeat: u8,
    /// Leave the interface's own address out of the probe list
    pub exclude_self: bool,
    /// Hardware-address filter applied to unique responders
    pub filter: HwFilter,
    /// Upper bound on a single name lookup
    pub resolve_timeout: Duration,
    /// Headroom in the receiver → collector reply queue.
    ///
    /// The queue holds one slot per probe plus this many, so solicited replies
    /// are never dropped while the transmitter is still running.
    pub channel_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(1000),
            interval: Duration::from_millis(1),
            repeat: 2,
            exclude_self: false,
            filter: HwFilter::any(),
            resolve_timeout: Duration::from_millis(1000),
            channel_capacity: 256,
        }
    }
}

impl ScanConfig {
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_repeat(mut self, repeat: u8) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_exclude_self(mut self, exclude_self: bool) -> Self {
        self.exclude_self = exclude_self;
        self
    }

    pub fn with_filter(mut self, filter: HwFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Reject values the scan loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.repeat == 0 {
            return Err(Error::invalid_config("repeat", "must be at least 1"));
        }
        if self.channel_capacity == 0 {
            return Err(Error::invalid_config("channel_capacity", "must be at least 1"));
        }
        if self.wait.is_zero() {
            return Err(Error::invalid_config("wait", "must be greater than zero"));
        }
        Ok(())
    }
}
