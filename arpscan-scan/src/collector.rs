//! Per-interface scan loop
//!
//! A scan validates the interface, opens its link, starts a [`Receiver`] on a
//! blocking thread, sends every probe with the [`Transmitter`] and then drains
//! replies until the wait window closes. Each responder is reported at most
//! once per scan.

use crate::config::ScanConfig;
use crate::receiver::{Receiver, StopSignal};
use crate::report::{ReplyRecord, Reporter};
use crate::resolver::NameResolver;
use crate::transmitter::Transmitter;
use arpscan_capture::{FrameSink, LinkOpener, StatsAccumulator};
use arpscan_core::{
    host_addresses, validate_scan_network, Error, Interface, Ipv4Network, MacAddr, Result,
};
use arpscan_packet::ArpPacket;
use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// Why an interface was left out of the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoIpv4,
    Loopback,
    LinkLocal,
    NoHardwareAddress,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::NoIpv4 => "no IPv4 address",
            SkipReason::Loopback => "loopback address",
            SkipReason::LinkLocal => "link-local address",
            SkipReason::NoHardwareAddress => "no hardware address",
        };
        f.write_str(reason)
    }
}

/// Counters describing one finished interface scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Request frames written
    pub probes_sent: usize,
    /// Frames read from the link, of any kind
    pub frames_seen: u64,
    /// Replies that passed the receiver's checks
    pub replies_accepted: u64,
    /// Distinct responder addresses
    pub unique_responders: usize,
    /// Records that passed the filter and were reported
    pub records_reported: usize,
    /// Replies lost to a full reply queue
    pub replies_dropped: u64,
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} probes, {} frames, {} replies, {} responders, {} reported, {} dropped",
            self.probes_sent,
            self.frames_seen,
            self.replies_accepted,
            self.unique_responders,
            self.records_reported,
            self.replies_dropped
        )
    }
}

/// How an interface scan ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(ScanSummary),
    Skipped(SkipReason),
}

/// Everything the scan needs from a validated interface
#[derive(Debug, Clone)]
struct ScanTarget {
    mac: MacAddr,
    network: Ipv4Network,
    hosts: Vec<Ipv4Addr>,
}

/// Stops the receiver when dropped, whichever way the scan exits
struct StopGuard(StopSignal);

impl Drop for StopGuard {
    fn drop(&mut self) {
        if self.0.stop() {
            debug!("Receiver stop requested on scan exit");
        }
    }
}

/// Runs the scan of a single interface
#[derive(Clone)]
pub struct Collector {
    config: ScanConfig,
    opener: Arc<dyn LinkOpener>,
    resolver: Option<Arc<dyn NameResolver>>,
    reporter: Arc<dyn Reporter>,
}

impl Collector {
    pub fn new(
        config: ScanConfig,
        opener: Arc<dyn LinkOpener>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            config,
            opener,
            resolver: None,
            reporter,
        }
    }

    /// Annotate records with names from `resolver`
    pub fn with_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    /// Scan one interface.
    ///
    /// Interfaces that cannot be scanned at all come back as
    /// [`ScanOutcome::Skipped`]; a subnet that is too large, a link that will
    /// not open, a failed probe write or a capture failure is an error.
    pub async fn scan(&self, iface: &Interface) -> Result<ScanOutcome> {
        let span = info_span!("scan", scan_id = %Uuid::now_v7(), interface = %iface.name);
        self.scan_inner(iface).instrument(span).await
    }

    async fn scan_inner(&self, iface: &Interface) -> Result<ScanOutcome> {
        let target = match self.validate(iface)? {
            Ok(target) => target,
            Err(reason) => {
                debug!(%reason, "Skipping interface");
                return Ok(ScanOutcome::Skipped(reason));
            }
        };

        info!(
            network = %target.network,
            hosts = target.hosts.len(),
            "Scanning"
        );

        let (mut sink, source) = self.opener.open(iface)?.split();

        let stats = StatsAccumulator::new();
        let (tx, mut rx) = mpsc::channel(self.queue_capacity(&target));
        let stop = StopSignal::new();
        let guard = StopGuard(stop.clone());

        let receiver = Receiver::new(target.mac, stats.clone());
        let reader_span = Span::current();
        let reader = tokio::task::spawn_blocking(move || {
            reader_span.in_scope(|| receiver.run(source, tx, stop))
        });

        let mut summary = ScanSummary::default();
        let result = self
            .transmit_and_drain(&iface.name, &target, sink.as_mut(), &mut rx, &mut summary)
            .await;

        drop(guard);
        let joined = reader.await;
        drop(sink);

        let snapshot = stats.snapshot();
        summary.frames_seen = snapshot.frames_received;
        summary.replies_accepted = snapshot.replies_forwarded;
        summary.replies_dropped = snapshot.replies_dropped;

        result?;
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(e) => return Err(Error::ExecutionFailed(format!("receiver task failed: {}", e))),
        }

        debug!(capture = %snapshot.format(), "Capture statistics");
        info!(%summary, "Scan finished");
        Ok(ScanOutcome::Completed(summary))
    }

    /// One slot per probe plus the configured headroom
    fn queue_capacity(&self, target: &ScanTarget) -> usize {
        let probes = target.hosts.len() * usize::from(self.config.repeat.max(1));
        probes.saturating_add(self.config.channel_capacity)
    }

    /// Check the interface can be scanned and enumerate its hosts.
    ///
    /// The outer error is fatal for the interface; the inner one is a skip.
    fn validate(&self, iface: &Interface) -> Result<std::result::Result<ScanTarget, SkipReason>> {
        let Some(network) = iface.first_ipv4() else {
            return Ok(Err(SkipReason::NoIpv4));
        };
        let addr = network.ip();

        if iface.is_loopback || addr.is_loopback() {
            return Ok(Err(SkipReason::Loopback));
        }
        if addr.is_link_local() {
            return Ok(Err(SkipReason::LinkLocal));
        }

        validate_scan_network(&network)?;

        let Some(mac) = iface.mac_address.filter(|m| !m.is_zero()) else {
            return Ok(Err(SkipReason::NoHardwareAddress));
        };

        let mut hosts = host_addresses(addr, network.mask())?;
        if self.config.exclude_self {
            hosts.retain(|h| *h != addr);
        }

        Ok(Ok(ScanTarget { mac, network, hosts }))
    }

    async fn transmit_and_drain(
        &self,
        interface: &str,
        target: &ScanTarget,
        sink: &mut dyn FrameSink,
        rx: &mut mpsc::Receiver<ArpPacket>,
        summary: &mut ScanSummary,
    ) -> Result<()> {
        let transmitter = Transmitter::new(
            target.mac,
            target.network.ip(),
            self.config.interval,
            self.config.repeat,
        );
        summary.probes_sent = transmitter.transmit(sink, &target.hosts).await?;

        debug!(wait = ?self.config.wait, "Probes sent, draining replies");
        self.drain(interface, rx, summary).await;
        Ok(())
    }

    async fn drain(
        &self,
        interface: &str,
        rx: &mut mpsc::Receiver<ArpPacket>,
        summary: &mut ScanSummary,
    ) {
        let mut history: HashSet<Ipv4Addr> = HashSet::new();
        let mut lookups = JoinSet::new();

        let deadline = sleep(self.config.wait);
        tokio::pin!(deadline);

        loop {
            let packet = tokio::select! {
                _ = &mut deadline => break,
                packet = rx.recv() => match packet {
                    Some(packet) => packet,
                    None => {
                        debug!("Receiver closed before the deadline");
                        break;
                    }
                },
            };

            let ip = packet.sender_proto_addr;
            if !history.insert(ip) {
                continue;
            }

            let mac = packet.sender_hw_addr;
            if !self.config.filter.matches(&mac) {
                debug!(%ip, %mac, "Filtered out");
                continue;
            }

            let record = ReplyRecord::new(ip, mac);
            match &self.resolver {
                Some(resolver) => {
                    let resolver = resolver.clone();
                    let reporter = self.reporter.clone();
                    let interface = interface.to_string();
                    let limit = self.config.resolve_timeout;
                    lookups.spawn(
                        async move {
                            let record = match timeout(limit, resolver.resolve(ip)).await {
                                Ok(Ok(name)) => record.with_name(name),
                                Ok(Err(e)) => {
                                    warn!(%ip, error = %e, "Name lookup failed");
                                    record
                                }
                                Err(_) => {
                                    warn!(%ip, "Name lookup timed out");
                                    record
                                }
                            };
                            reporter.report(&interface, &record);
                        }
                        .in_current_span(),
                    );
                }
                None => {
                    self.reporter.report(interface, &record);
                    summary.records_reported += 1;
                }
            }
        }

        summary.unique_responders = history.len();

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok(()) => summary.records_reported += 1,
                Err(e) => warn!(error = %e, "Name lookup task failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpscan_capture::CaptureHandle;

    struct NullReporter;

    impl Reporter for NullReporter {
        fn report(&self, _interface: &str, _record: &ReplyRecord) {}
        fn report_error(&self, _interface: &str, _error: &Error) {}
    }

    struct RefusingOpener;

    impl LinkOpener for RefusingOpener {
        fn open(&self, interface: &Interface) -> Result<CaptureHandle> {
            Err(Error::capture(format!("cannot open {}", interface.name)))
        }
    }

    fn collector(config: ScanConfig) -> Collector {
        Collector::new(config, Arc::new(RefusingOpener), Arc::new(NullReporter))
    }

    fn eth0(net: &str) -> Interface {
        Interface::new("eth0", 2, Some(MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55])))
            .with_ipv4(net.parse().unwrap())
    }

    #[test]
    fn test_validate_skips() {
        let c = collector(ScanConfig::default());

        let bare = Interface::new("eth0", 2, Some(MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55])));
        assert_eq!(c.validate(&bare).unwrap().unwrap_err(), SkipReason::NoIpv4);

        let mut lo = Interface::new("lo", 1, None).with_ipv4("127.0.0.1/8".parse().unwrap());
        lo.is_loopback = true;
        assert_eq!(c.validate(&lo).unwrap().unwrap_err(), SkipReason::Loopback);

        let ll = eth0("169.254.10.20/24");
        assert_eq!(c.validate(&ll).unwrap().unwrap_err(), SkipReason::LinkLocal);

        let tun = Interface::new("tun0", 5, None).with_ipv4("10.8.0.2/24".parse().unwrap());
        assert_eq!(c.validate(&tun).unwrap().unwrap_err(), SkipReason::NoHardwareAddress);
    }

    #[test]
    fn test_validate_rejects_large_subnet() {
        let c = collector(ScanConfig::default());
        match c.validate(&eth0("10.0.0.5/16")) {
            Err(Error::SubnetTooLarge { prefix: 16, .. }) => {}
            other => panic!("expected SubnetTooLarge, got {:?}", other.map(|r| r.is_ok())),
        }
    }

    #[test]
    fn test_validate_host_list() {
        let target = collector(ScanConfig::default())
            .validate(&eth0("10.0.0.5/24"))
            .unwrap()
            .unwrap();
        assert_eq!(target.hosts.len(), 254);
        assert!(target.hosts.contains(&Ipv4Addr::new(10, 0, 0, 5)));

        let target = collector(ScanConfig::default().with_exclude_self(true))
            .validate(&eth0("10.0.0.5/24"))
            .unwrap()
            .unwrap();
        assert_eq!(target.hosts.len(), 253);
        assert!(!target.hosts.contains(&Ipv4Addr::new(10, 0, 0, 5)));
    }

    #[test]
    fn test_queue_holds_every_solicited_reply() {
        let c = collector(ScanConfig::default().with_channel_capacity(4).with_repeat(3));
        let target = c.validate(&eth0("10.0.0.5/24")).unwrap().unwrap();
        assert_eq!(c.queue_capacity(&target), 254 * 3 + 4);
    }

    #[tokio::test]
    async fn test_open_failure_is_interface_error() {
        let result = collector(ScanConfig::default()).scan(&eth0("10.0.0.5/24")).await;
        assert!(matches!(result, Err(Error::Capture(_))));
    }

    #[tokio::test]
    async fn test_skip_does_not_open_link() {
        let bare = Interface::new("tun0", 5, None);
        let outcome = collector(ScanConfig::default()).scan(&bare).await.unwrap();
        assert_eq!(outcome, ScanOutcome::Skipped(SkipReason::NoIpv4));
    }

    #[test]
    fn test_summary_display() {
        let summary = ScanSummary {
            probes_sent: 508,
            frames_seen: 40,
            replies_accepted: 3,
            unique_responders: 2,
            records_reported: 2,
            replies_dropped: 0,
        };
        assert_eq!(
            summary.to_string(),
            "508 probes, 40 frames, 3 replies, 2 responders, 2 reported, 0 dropped"
        );
    }
}
