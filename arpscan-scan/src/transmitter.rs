//! Probe transmission

use arpscan_capture::FrameSink;
use arpscan_core::{Error, MacAddr, Result};
use arpscan_packet::build_request_frame;
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::task::yield_now;
use tokio::time::sleep;
use tracing::{debug, trace};

/// Writes one ARP request per target address, `repeat` passes over the list.
#[derive(Debug, Clone)]
pub struct Transmitter {
    sender_mac: MacAddr,
    sender_ip: Ipv4Addr,
    interval: Duration,
    repeat: u8,
}

impl Transmitter {
    pub fn new(sender_mac: MacAddr, sender_ip: Ipv4Addr, interval: Duration, repeat: u8) -> Self {
        Self {
            sender_mac,
            sender_ip,
            interval,
            repeat: repeat.max(1),
        }
    }

    /// Send every probe, returning the number of frames written.
    ///
    /// The first failed write aborts the pass. With a zero interval the task
    /// still yields between frames so the reply drain and other interface
    /// scans keep running on the same worker.
    pub async fn transmit(&self, sink: &mut dyn FrameSink, targets: &[Ipv4Addr]) -> Result<usize> {
        let mut sent = 0;

        for pass in 0..self.repeat {
            trace!(pass, targets = targets.len(), "Starting probe pass");
            for &target in targets {
                let frame = build_request_frame(self.sender_mac, self.sender_ip, target);
                sink.send_frame(&frame).map_err(|e| match e {
                    Error::Transmit(msg) => {
                        Error::transmit(format!("probe to {}: {}", target, msg))
                    }
                    other => other,
                })?;
                sent += 1;

                if self.interval.is_zero() {
                    yield_now().await;
                } else {
                    sleep(self.interval).await;
                }
            }
        }

        debug!(sent, "Probes written");
        Ok(sent)
    }
}
