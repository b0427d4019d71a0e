//! Capture loop that turns raw frames into accepted ARP replies

use arpscan_capture::{FrameSource, StatsAccumulator};
use arpscan_core::{MacAddr, Result};
use arpscan_packet::{decode_arp, ArpPacket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, trace, warn};

/// One-shot cancellation flag observed by the receive loop.
///
/// Stopping is idempotent; clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `true` only for the call that actually stopped it.
    pub fn stop(&self) -> bool {
        !self.stopped.swap(true, Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Why a frame did not reach the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Malformed,
    NotArp,
    NotReply,
    SelfOriginated,
}

/// Reads frames from one interface and forwards ARP replies
#[derive(Debug, Clone)]
pub struct Receiver {
    local_mac: MacAddr,
    stats: StatsAccumulator,
}

impl Receiver {
    pub fn new(local_mac: MacAddr, stats: StatsAccumulator) -> Self {
        Self { local_mac, stats }
    }

    /// Classify one captured frame
    pub fn inspect(&self, frame: &[u8]) -> (Verdict, Option<ArpPacket>) {
        let packet = match decode_arp(frame) {
            Ok(Some(packet)) => packet,
            Ok(None) => return (Verdict::NotArp, None),
            Err(e) => {
                trace!(error = %e, len = frame.len(), "Skipping malformed frame");
                return (Verdict::Malformed, None);
            }
        };

        if !packet.is_reply() {
            return (Verdict::NotReply, None);
        }
        if !packet.is_well_formed_reply() {
            return (Verdict::Malformed, None);
        }
        if packet.sender_hw_addr == self.local_mac {
            return (Verdict::SelfOriginated, None);
        }

        (Verdict::Accept, Some(packet))
    }

    /// Blocking read loop; meant for `spawn_blocking`.
    ///
    /// Returns `Ok` when `stop` is raised or the collector hangs up, and the
    /// capture error when the link fails. The source is dropped on return,
    /// which releases the read side of the handle.
    pub fn run(
        &self,
        mut source: Box<dyn FrameSource>,
        tx: mpsc::Sender<ArpPacket>,
        stop: StopSignal,
    ) -> Result<()> {
        debug!(local_mac = %self.local_mac, "Receiver started");

        while !stop.is_stopped() {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => continue,
                Err(e) => {
                    error!(error = %e, "Capture failed, receiver exiting");
                    return Err(e);
                }
            };

            self.stats.record_frame(frame.len());

            let packet = match self.inspect(frame) {
                (Verdict::Accept, Some(packet)) => packet,
                (Verdict::Malformed, _) => {
                    self.stats.record_malformed();
                    continue;
                }
                (verdict, _) => {
                    trace!(?verdict, "Frame skipped");
                    continue;
                }
            };

            match tx.try_send(packet) {
                Ok(()) => self.stats.record_forwarded(),
                Err(TrySendError::Full(packet)) => {
                    self.stats.record_dropped();
                    warn!(ip = %packet.sender_proto_addr, "Reply queue full, dropping reply");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Collector gone, receiver exiting");
                    break;
                }
            }
        }

        debug!("Receiver stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpscan_core::Error;
    use arpscan_packet::{build_request_frame, EtherType, EthernetFrame};
    use std::collections::VecDeque;
    use std::net::Ipv4Addr;

    const LOCAL: MacAddr = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    const REMOTE: MacAddr = MacAddr([0xaa, 0xbb, 0xcc, 0x00, 0x00, 0x01]);

    fn reply_frame(sender: MacAddr, ip: Ipv4Addr) -> Vec<u8> {
        let arp = ArpPacket::new_reply(sender, ip, LOCAL, Ipv4Addr::new(10, 0, 0, 5));
        EthernetFrame::new(LOCAL, sender, EtherType::ARP, arp.serialize()).to_bytes()
    }

    /// Yields the queued frames, then stops the signal on the next read
    struct ScriptedSource {
        frames: VecDeque<Vec<u8>>,
        current: Vec<u8>,
        stop: StopSignal,
        fail_at_end: bool,
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Option<&[u8]>> {
            match self.frames.pop_front() {
                Some(frame) => {
                    self.current = frame;
                    Ok(Some(self.current.as_slice()))
                }
                None if self.fail_at_end => Err(Error::capture("link vanished")),
                None => {
                    self.stop.stop();
                    Ok(None)
                }
            }
        }
    }

    fn run_with(frames: Vec<Vec<u8>>, capacity: usize) -> (Vec<ArpPacket>, StatsAccumulator) {
        let stats = StatsAccumulator::new();
        let stop = StopSignal::new();
        let source = ScriptedSource {
            frames: frames.into(),
            current: Vec::new(),
            stop: stop.clone(),
            fail_at_end: false,
        };
        let (tx, mut rx) = mpsc::channel(capacity);

        Receiver::new(LOCAL, stats.clone())
            .run(Box::new(source), tx, stop)
            .unwrap();

        let mut out = Vec::new();
        while let Ok(packet) = rx.try_recv() {
            out.push(packet);
        }
        (out, stats)
    }

    #[test]
    fn test_stop_signal_is_idempotent() {
        let stop = StopSignal::new();
        let other = stop.clone();
        assert!(!other.is_stopped());
        assert!(stop.stop());
        assert!(!stop.stop());
        assert!(!other.stop());
        assert!(other.is_stopped());
    }

    #[test]
    fn test_inspect_verdicts() {
        let receiver = Receiver::new(LOCAL, StatsAccumulator::new());
        let ip = Ipv4Addr::new(10, 0, 0, 2);

        assert_eq!(receiver.inspect(&reply_frame(REMOTE, ip)).0, Verdict::Accept);
        assert_eq!(receiver.inspect(&reply_frame(LOCAL, ip)).0, Verdict::SelfOriginated);
        assert_eq!(
            receiver.inspect(&reply_frame(MacAddr::zero(), ip)).0,
            Verdict::Malformed
        );
        assert_eq!(
            receiver.inspect(&build_request_frame(REMOTE, ip, Ipv4Addr::new(10, 0, 0, 5))).0,
            Verdict::NotReply
        );

        let ipv4 = EthernetFrame::new(LOCAL, REMOTE, EtherType::IPv4, vec![0x45; 40]).to_bytes();
        assert_eq!(receiver.inspect(&ipv4).0, Verdict::NotArp);

        let mut truncated = reply_frame(REMOTE, ip);
        truncated.truncate(20);
        assert_eq!(receiver.inspect(&truncated).0, Verdict::Malformed);
    }

    #[test]
    fn test_run_forwards_only_foreign_replies() {
        let frames = vec![
            reply_frame(REMOTE, Ipv4Addr::new(10, 0, 0, 2)),
            reply_frame(LOCAL, Ipv4Addr::new(10, 0, 0, 5)),
            build_request_frame(REMOTE, Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(10, 0, 0, 9)),
            vec![0xff; 10],
            reply_frame(REMOTE, Ipv4Addr::new(10, 0, 0, 2)),
        ];

        let (packets, stats) = run_with(frames, 16);

        assert_eq!(packets.len(), 2);
        assert!(packets.iter().all(|p| p.sender_hw_addr == REMOTE));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames_received, 5);
        assert_eq!(snapshot.frames_malformed, 1);
        assert_eq!(snapshot.replies_forwarded, 2);
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let frames = (1..=4)
            .map(|i| reply_frame(REMOTE, Ipv4Addr::new(10, 0, 0, i)))
            .collect();

        let (packets, stats) = run_with(frames, 1);

        assert_eq!(packets.len(), 1);
        assert_eq!(stats.snapshot().replies_dropped, 3);
    }

    #[test]
    fn test_capture_error_is_returned() {
        let stop = StopSignal::new();
        let source = ScriptedSource {
            frames: vec![reply_frame(REMOTE, Ipv4Addr::new(10, 0, 0, 2))].into(),
            current: Vec::new(),
            stop: stop.clone(),
            fail_at_end: true,
        };
        let (tx, mut rx) = mpsc::channel(4);

        let result = Receiver::new(LOCAL, StatsAccumulator::new())
            .run(Box::new(source), tx, stop.clone());

        assert!(matches!(result, Err(Error::Capture(_))));
        assert!(!stop.is_stopped());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_closed_channel_ends_loop() {
        let stop = StopSignal::new();
        let source = ScriptedSource {
            frames: vec![reply_frame(REMOTE, Ipv4Addr::new(10, 0, 0, 2))].into(),
            current: Vec::new(),
            stop: stop.clone(),
            fail_at_end: true,
        };
        let (tx, rx) = mpsc::channel(4);
        drop(rx);

        let stats = StatsAccumulator::new();
        let result = Receiver::new(LOCAL, stats.clone()).run(Box::new(source), tx, stop);

        assert!(result.is_ok());
        assert_eq!(stats.snapshot().replies_forwarded, 0);
    }
}
