use arpscan_capture::{list_interfaces, select_interfaces, DatalinkOpener};
use arpscan_cli::{exit_status, init_logging, Cli};
use arpscan_core::Result;
use arpscan_scan::{ConsoleReporter, Scanner};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.log_level());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Fatal error");
            eprintln!("arpscan: {}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let interfaces = list_interfaces()?;

    if cli.list_interfaces {
        for iface in &interfaces {
            println!("{}", iface);
        }
        return Ok(());
    }

    let interfaces = select_interfaces(interfaces, &cli.interface)?;
    let config = cli.to_scan_config()?;
    debug!(?config, "Scan configuration");

    let mut scanner = Scanner::new(
        config,
        Arc::new(DatalinkOpener::default()),
        Arc::new(ConsoleReporter),
    )?;
    if let Some(resolver) = cli.name_resolver() {
        debug!(kind = ?cli.resolver, "Name lookups enabled");
        scanner = scanner.with_resolver(resolver);
    }

    // Interface failures were already reported; they do not change the exit status
    let results = scanner.run(interfaces).await;
    debug!(
        failed = results.iter().filter(|r| r.is_err()).count(),
        total = results.len(),
        "Done"
    );

    Ok(())
}
