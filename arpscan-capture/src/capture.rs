//! Raw link access: one capture handle per interface, split into send and receive halves

use arpscan_core::{Error, Interface, Result};
use pnet_datalink::{Channel, DataLinkReceiver, DataLinkSender};
use std::io;
use std::time::Duration;
use tracing::{debug, info};

use crate::interface::find_by_name;

/// Default read timeout; bounds how long a reader takes to notice a stop request
const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

/// Default socket buffer size
const DEFAULT_BUFFER_SIZE: usize = 65536;

/// Configuration for opening a capture handle
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// How long a single read may block before returning empty
    pub read_timeout: Duration,
    /// Enable promiscuous mode
    pub promiscuous: bool,
    /// Read buffer size in bytes
    pub read_buffer_size: usize,
    /// Write buffer size in bytes
    pub write_buffer_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            promiscuous: true,
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            write_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Write side of a capture handle
pub trait FrameSink: Send {
    /// Put one complete Ethernet frame on the wire
    fn send_frame(&mut self, frame: &[u8]) -> Result<()>;
}

/// Read side of a capture handle
pub trait FrameSource: Send {
    /// Next captured frame, or `None` when the read timeout elapsed first
    fn next_frame(&mut self) -> Result<Option<&[u8]>>;
}

/// An open capture handle for one interface.
///
/// The two halves are independent so a reader and a writer can run
/// concurrently without sharing a lock. Dropping both halves closes the handle.
pub struct CaptureHandle {
    /// Interface the handle is bound to
    pub interface: String,
    /// Write half
    pub sink: Box<dyn FrameSink>,
    /// Read half
    pub source: Box<dyn FrameSource>,
}

impl CaptureHandle {
    /// Split into write and read halves
    pub fn split(self) -> (Box<dyn FrameSink>, Box<dyn FrameSource>) {
        (self.sink, self.source)
    }
}

/// Opens capture handles; the seam between the scan engine and the OS
pub trait LinkOpener: Send + Sync {
    fn open(&self, interface: &Interface) -> Result<CaptureHandle>;
}

/// Capture handles backed by `pnet_datalink` Ethernet channels
#[derive(Debug, Clone, Default)]
pub struct DatalinkOpener {
    config: CaptureConfig,
}

impl DatalinkOpener {
    /// Create an opener with custom configuration
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }
}

impl LinkOpener for DatalinkOpener {
    fn open(&self, interface: &Interface) -> Result<CaptureHandle> {
        debug!("Opening datalink channel on {}", interface.name);

        let iface = find_by_name(&interface.name)?;
        let config = pnet_datalink::Config {
            read_timeout: Some(self.config.read_timeout),
            promiscuous: self.config.promiscuous,
            read_buffer_size: self.config.read_buffer_size,
            write_buffer_size: self.config.write_buffer_size,
            ..Default::default()
        };

        let (tx, rx) = match pnet_datalink::channel(&iface, config) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => return Err(Error::capture("Unsupported channel type")),
            Err(e) => {
                return Err(Error::capture(format!(
                    "Failed to open channel on {}: {}",
                    interface.name, e
                )))
            }
        };

        info!("Capture handle opened on {}", interface.name);
        Ok(CaptureHandle {
            interface: interface.name.clone(),
            sink: Box::new(DatalinkSink { tx }),
            source: Box::new(DatalinkSource { rx }),
        })
    }
}

struct DatalinkSink {
    tx: Box<dyn DataLinkSender>,
}

impl FrameSink for DatalinkSink {
    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.tx
            .send_to(frame, None)
            .ok_or_else(|| Error::transmit("Failed to send packet"))?
            .map_err(|e| Error::transmit(format!("Send error: {}", e)))
    }
}

struct DatalinkSource {
    rx: Box<dyn DataLinkReceiver>,
}

impl FrameSource for DatalinkSource {
    fn next_frame(&mut self) -> Result<Option<&[u8]>> {
        match self.rx.next() {
            Ok(frame) => Ok(Some(frame)),
            Err(e) if is_timeout(&e) => Ok(None),
            Err(e) => Err(Error::capture(format!("Read error: {}", e))),
        }
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
