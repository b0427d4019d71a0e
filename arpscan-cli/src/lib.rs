//! CLI interface for arpscan
//!
//! This crate provides the `arpscan` binary's argument parsing and the
//! logging setup it runs under.

pub mod args;
pub mod logging;

pub use args::{exit_status, Cli, ResolverKind};
pub use logging::init_logging;
