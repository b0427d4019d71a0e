//! CLI argument parsing
//!
//! Flags map onto [`ScanConfig`]; anything left out keeps the library default.

use arpscan_core::{Error, Result};
use arpscan_scan::{DigResolver, HwFilter, MdnsResolver, NameResolver, ScanConfig};
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;

/// Name lookup backend for responders
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolverKind {
    /// Reverse multicast-DNS lookup sent directly from arpscan
    Mdns,
    /// Reverse multicast-DNS lookup through `dig`
    Dig,
    /// Do not resolve names; records print in arrival order
    None,
}

#[derive(Parser, Debug)]
#[command(name = "arpscan")]
#[command(version, about = "Discover hosts on local IPv4 subnets with ARP", long_about = None)]
pub struct Cli {
    /// Show only Raspberry Pi devices (hardware address b8:27:eb:...)
    #[arg(short = 'r', long, conflicts_with = "filter")]
    pub raspberry_pi: bool,

    /// Show only devices whose hardware address contains this substring
    #[arg(short = 'f', long, value_name = "SUBSTRING")]
    pub filter: Option<String>,

    /// Milliseconds to wait for replies after the last probe
    #[arg(short = 'w', long, value_name = "MS", default_value_t = 1000)]
    pub wait: u64,

    /// Milliseconds between ARP requests (0 sends back-to-back)
    #[arg(short = 'i', long, value_name = "MS", default_value_t = 1)]
    pub interval: u64,

    /// How many times each address is probed
    #[arg(short = 'n', long, value_name = "COUNT", default_value_t = 2)]
    pub repeat: u8,

    /// Do not probe the interface's own address
    #[arg(long)]
    pub exclude_self: bool,

    /// Scan only this interface (repeatable)
    #[arg(short = 'I', long, value_name = "NAME")]
    pub interface: Vec<String>,

    /// Name lookup backend
    #[arg(long, value_enum, default_value_t = ResolverKind::Mdns)]
    pub resolver: ResolverKind,

    /// Milliseconds allowed for one name lookup
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub resolve_timeout: u64,

    /// List network interfaces and exit
    #[arg(short = 'l', long)]
    pub list_interfaces: bool,

    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Hardware-address filter selected by `-r` / `-f`
    pub fn hw_filter(&self) -> HwFilter {
        if self.raspberry_pi {
            HwFilter::raspberry_pi()
        } else {
            self.filter.as_deref().map(HwFilter::new).unwrap_or_default()
        }
    }

    /// Build and validate the scan configuration
    pub fn to_scan_config(&self) -> Result<ScanConfig> {
        let config = ScanConfig::default()
            .with_wait(Duration::from_millis(self.wait))
            .with_interval(Duration::from_millis(self.interval))
            .with_repeat(self.repeat)
            .with_exclude_self(self.exclude_self)
            .with_filter(self.hw_filter())
            .with_resolve_timeout(Duration::from_millis(self.resolve_timeout));
        config.validate()?;
        Ok(config)
    }

    /// Name resolver selected by `--resolver`
    pub fn name_resolver(&self) -> Option<Arc<dyn NameResolver>> {
        match self.resolver {
            ResolverKind::Mdns => Some(Arc::new(MdnsResolver::new())),
            ResolverKind::Dig => Some(Arc::new(DigResolver::new())),
            ResolverKind::None => None,
        }
    }

    /// Default tracing filter directive for the `-v` count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Process exit status for a fatal error; bad settings exit like usage errors
pub fn exit_status(error: &Error) -> u8 {
    if error.is_config() {
        2
    } else {
        1
    }
}
