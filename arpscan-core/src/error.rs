//! Error types for arpscan

use thiserror::Error;

/// Result type alias for arpscan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for arpscan
#[derive(Error, Debug)]
pub enum Error {
    /// Network I/O error
    #[error("Network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Interface not found
    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Interface error
    #[error("Interface error: {0}")]
    Interface(String),

    /// The address/mask pair does not describe a scannable subnet
    #[error("Invalid subnet: {0}")]
    InvalidSubnet(String),

    /// The subnet holds more hosts than a single scan accepts
    #[error("mask means network is too large: /{prefix} holds {hosts} hosts (max {max})")]
    SubnetTooLarge { prefix: u8, hosts: u32, max: u32 },

    /// Capture handle could not be opened or read
    #[error("Packet capture error: {0}")]
    Capture(String),

    /// Writing a frame onto the link failed
    #[error("Transmit error: {0}")]
    Transmit(String),

    /// Packet construction error
    #[error("Packet construction error: {0}")]
    PacketConstruction(String),

    /// Packet parsing error
    #[error("Packet parsing error: {0}")]
    PacketParsing(String),

    /// Name lookup failed or timed out
    #[error("Name resolution error: {0}")]
    Resolve(String),

    /// Invalid configuration value
    #[error("Invalid configuration '{name}': {reason}")]
    InvalidConfig { name: String, reason: String },

    /// Execution failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl Error {
    /// Create a capture error with a custom message
    pub fn capture<S: Into<String>>(msg: S) -> Self {
        Error::Capture(msg.into())
    }

    /// Create a transmit error with a custom message
    pub fn transmit<S: Into<String>>(msg: S) -> Self {
        Error::Transmit(msg.into())
    }

    /// Create a packet parsing error with a custom message
    pub fn parsing<S: Into<String>>(msg: S) -> Self {
        Error::PacketParsing(msg.into())
    }

    /// Create an invalid subnet error with a custom message
    pub fn invalid_subnet<S: Into<String>>(msg: S) -> Self {
        Error::InvalidSubnet(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config<S: Into<String>>(name: S, reason: S) -> Self {
        Error::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a configuration problem rather than a runtime failure
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::InvalidSubnet(_) | Error::SubnetTooLarge { .. } | Error::InvalidConfig { .. }
        )
    }
}
