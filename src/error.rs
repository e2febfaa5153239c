//! Error types shared across the shipper.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Transport-layer failures on the flush path.
///
/// Every variant is reported and the batch is parked in the overflow buffer
/// for a later retry. All but [`ShipError::Frame`] also drop the live
/// connection.
#[derive(Debug, Error)]
pub enum ShipError {
    /// The collector host did not resolve to any address.
    #[error("DNS lookup failed for {host}: {reason}")]
    Resolution { host: String, reason: String },
    /// No resolved address accepted a connection.
    #[error("could not connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// The protocol marker or auth token could not be sent.
    #[error("handshake with {endpoint} failed: {source}")]
    Handshake {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    /// Writing a batch to the socket failed.
    #[error("error sending batch: {0}")]
    Encode(#[source] io::Error),
    /// The batch could not be serialised into one frame; nothing was written.
    #[error("could not frame batch: {0}")]
    Frame(#[source] io::Error),
}

impl ShipError {
    /// Whether the connection used for the failed attempt is still usable.
    pub fn connection_intact(&self) -> bool {
        matches!(self, Self::Frame(_))
    }
}

/// Errors raised while building a shipper.
#[derive(Debug, Error)]
pub enum ShipperBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid shipper configuration: {0}")]
    InvalidConfig(String),
    /// The configuration file could not be read or parsed.
    #[error("invalid config file {}: {reason}", path.display())]
    ConfigFile { path: PathBuf, reason: String },
    /// Underlying I/O error, e.g. while spawning the ingest thread.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reasons a collector rejects an incoming shipper connection.
#[derive(Debug, Error)]
pub enum CatcherError {
    #[error("unsupported protocol version {0}")]
    UnsupportedProtocol(i32),
    #[error("authentication token rejected")]
    Unauthorised,
    #[error(transparent)]
    Io(#[from] io::Error),
}
