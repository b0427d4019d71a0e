//! Capture statistics and metrics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Statistics for one interface's capture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureStats {
    /// Frames read from the link
    pub frames_received: u64,
    /// Total bytes read
    pub bytes_received: u64,
    /// Frames that failed to decode
    pub frames_malformed: u64,
    /// ARP replies handed to the collector
    pub replies_forwarded: u64,
    /// ARP replies lost because the reply queue was full
    pub replies_dropped: u64,
    /// Capture duration
    pub duration: Duration,
}

impl CaptureStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames per second over the capture duration
    pub fn frames_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.frames_received as f64 / secs
        } else {
            0.0
        }
    }

    /// Format statistics as human-readable string
    pub fn format(&self) -> String {
        format!(
            "Received: {} frames ({} bytes), malformed: {}, \
             replies forwarded: {}, dropped: {}, {:.2}s ({:.2} fps)",
            self.frames_received,
            self.bytes_received,
            self.frames_malformed,
            self.replies_forwarded,
            self.replies_dropped,
            self.duration.as_secs_f64(),
            self.frames_per_second()
        )
    }
}

/// Thread-safe statistics accumulator for live capture
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    frames_received: Arc<AtomicU64>,
    bytes_received: Arc<AtomicU64>,
    frames_malformed: Arc<AtomicU64>,
    replies_forwarded: Arc<AtomicU64>,
    replies_dropped: Arc<AtomicU64>,
    start_time: Instant,
}

impl StatsAccumulator {
    /// Create a new statistics accumulator
    pub fn new() -> Self {
        Self {
            frames_received: Arc::new(AtomicU64::new(0)),
            bytes_received: Arc::new(AtomicU64::new(0)),
            frames_malformed: Arc::new(AtomicU64::new(0)),
            replies_forwarded: Arc::new(AtomicU64::new(0)),
            replies_dropped: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a received frame
    pub fn record_frame(&self, size: usize) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(size as u64, Ordering::Relaxed);
    }

    /// Record a frame that failed to decode
    pub fn record_malformed(&self) {
        self.frames_malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reply handed to the collector
    pub fn record_forwarded(&self) {
        self.replies_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reply lost to a full queue
    pub fn record_dropped(&self) {
        self.replies_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            frames_malformed: self.frames_malformed.load(Ordering::Relaxed),
            replies_forwarded: self.replies_forwarded.load(Ordering::Relaxed),
            replies_dropped: self.replies_dropped.load(Ordering::Relaxed),
            duration: self.start_time.elapsed(),
        }
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_capture_stats_new() {
        let stats = CaptureStats::new();
        assert_eq!(stats.frames_received, 0);
        assert_eq!(stats.replies_dropped, 0);
        assert_eq!(stats.frames_per_second(), 0.0);
    }

    #[test]
    fn test_stats_format() {
        let stats = CaptureStats {
            frames_received: 1000,
            bytes_received: 64000,
            frames_malformed: 3,
            replies_forwarded: 12,
            replies_dropped: 1,
            duration: Duration::from_secs(10),
        };

        let formatted = stats.format();
        assert!(formatted.contains("1000"));
        assert!(formatted.contains("64000"));
        assert!(formatted.contains("100.00 fps"));
    }

    #[test]
    fn test_stats_accumulator_basic() {
        let acc = StatsAccumulator::new();

        acc.record_frame(64);
        acc.record_frame(128);
        acc.record_malformed();
        acc.record_forwarded();
        acc.record_dropped();

        let snapshot = acc.snapshot();
        assert_eq!(snapshot.frames_received, 2);
        assert_eq!(snapshot.bytes_received, 192);
        assert_eq!(snapshot.frames_malformed, 1);
        assert_eq!(snapshot.replies_forwarded, 1);
        assert_eq!(snapshot.replies_dropped, 1);
    }

    #[test]
    fn test_stats_accumulator_thread_safety() {
        let acc = StatsAccumulator::new();
        let acc_clone = acc.clone();

        let handle = thread::spawn(move || {
            for _ in 0..100 {
                acc_clone.record_frame(60);
            }
        });

        for _ in 0..100 {
            acc.record_frame(60);
        }

        handle.join().unwrap();

        assert_eq!(acc.snapshot().frames_received, 200);
        assert_eq!(acc.snapshot().bytes_received, 12000);
    }
}
