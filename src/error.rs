//! Crate-level error types.

use std::io;
use std::net::Ipv4Addr;

use crate::config::ConfigError;
use crate::packet::ParseError;
use crate::types::PortAddress;

/// Crate-level error type.
///
/// Control-plane failures (starting a runtime, validating a config,
/// addressing an unknown node) surface here. Data-plane failures inside
/// the receive and send loops are logged and swallowed instead; the
/// protocol is best-effort and continuous streaming matters more than
/// per-packet integrity.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A packet failed to decode.
    #[error("packet error: {0}")]
    Parse(#[from] ParseError),

    /// A node configuration failed validation.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// No node with this IP is in the controller's table.
    #[error("no known node with ip {0}")]
    UnknownNode(Ipv4Addr),

    /// The node has no output buffer for this Port-Address.
    #[error("node has no output at address {0}")]
    UnknownAddress(PortAddress),

    /// The runtime was started twice.
    #[error("already started")]
    AlreadyStarted,

    /// A socket operation failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, Error>;
