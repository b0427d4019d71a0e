//! Fan-out of interface scans

use crate::collector::{Collector, ScanOutcome};
use crate::config::ScanConfig;
use crate::report::Reporter;
use crate::resolver::NameResolver;
use arpscan_capture::LinkOpener;
use arpscan_core::{Error, Interface, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Result of scanning one interface
#[derive(Debug)]
pub struct InterfaceResult {
    pub interface: String,
    pub result: Result<ScanOutcome>,
}

impl InterfaceResult {
    pub fn is_err(&self) -> bool {
        self.result.is_err()
    }
}

/// Scans every interface concurrently, one task each
#[derive(Clone)]
pub struct Scanner {
    collector: Collector,
}

impl Scanner {
    /// Create a scanner, rejecting a configuration the scan loop cannot use
    pub fn new(
        config: ScanConfig,
        opener: Arc<dyn LinkOpener>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            collector: Collector::new(config, opener, reporter),
        })
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.collector = self.collector.with_resolver(resolver);
        self
    }

    /// Scan all `interfaces` and wait for every one of them.
    ///
    /// Failures are reported per interface as they happen and never affect
    /// the other scans. Results come back in input order.
    pub async fn run(&self, interfaces: Vec<Interface>) -> Vec<InterfaceResult> {
        info!(count = interfaces.len(), "Starting scan");

        let mut tasks = Vec::with_capacity(interfaces.len());
        for iface in interfaces {
            let collector = self.collector.clone();
            let name = iface.name.clone();
            let task = tokio::spawn(async move {
                let result = collector.scan(&iface).await;
                if let Err(e) = &result {
                    error!(interface = %iface.name, error = %e, "Interface scan failed");
                    collector.reporter().report_error(&iface.name, e);
                }
                result
            });
            tasks.push((name, task));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (name, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => {
                    let err = if e.is_panic() {
                        Error::ExecutionFailed("scan task panicked".to_string())
                    } else {
                        Error::ExecutionFailed(format!("failed to join scan task: {}", e))
                    };
                    error!(interface = %name, error = %err, "Interface scan aborted");
                    self.collector.reporter().report_error(&name, &err);
                    Err(err)
                }
            };

            if let Ok(ScanOutcome::Skipped(reason)) = &result {
                debug!(interface = %name, %reason, "Interface skipped");
            }
            results.push(InterfaceResult {
                interface: name,
                result,
            });
        }

        info!("All interface scans finished");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReplyRecord;
    use arpscan_capture::CaptureHandle;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct ErrorLog {
        errors: Mutex<Vec<String>>,
    }

    impl Reporter for ErrorLog {
        fn report(&self, _interface: &str, _record: &ReplyRecord) {}

        fn report_error(&self, interface: &str, error: &Error) {
            self.errors.lock().push(format!("{}: {}", interface, error));
        }
    }

    struct RefusingOpener;

    impl LinkOpener for RefusingOpener {
        fn open(&self, _interface: &Interface) -> Result<CaptureHandle> {
            Err(Error::capture("permission denied"))
        }
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let result = Scanner::new(
            ScanConfig::default().with_repeat(0),
            Arc::new(RefusingOpener),
            Arc::new(ErrorLog::default()),
        );
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[tokio::test]
    async fn test_each_interface_gets_its_own_result() {
        let log = Arc::new(ErrorLog::default());
        let scanner =
            Scanner::new(ScanConfig::default(), Arc::new(RefusingOpener), log.clone()).unwrap();

        let interfaces = vec![
            Interface::new("eth0", 2, Some(arpscan_core::MacAddr([2, 0, 0, 0, 0, 1])))
                .with_ipv4("10.0.0.5/24".parse().unwrap()),
            Interface::new("dummy0", 3, None),
        ];

        let results = scanner.run(interfaces).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].interface, "eth0");
        assert!(matches!(results[0].result, Err(Error::Capture(_))));
        assert_eq!(results[1].interface, "dummy0");
        assert!(matches!(results[1].result, Ok(ScanOutcome::Skipped(_))));

        let errors = log.errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("eth0: "));
    }

    #[tokio::test]
    async fn test_no_interfaces() {
        let scanner = Scanner::new(
            ScanConfig::default(),
            Arc::new(RefusingOpener),
            Arc::new(ErrorLog::default()),
        )
        .unwrap();
        assert!(scanner.run(Vec::new()).await.is_empty());
    }
}
