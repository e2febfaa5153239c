//! Interval-batched log shipping to a remote collector.
//!
//! Producers hand already-formatted lines to a [`FemtoShipper`]. Lines are
//! batched per reporting interval and sent over an authenticated TCP
//! connection; batches that cannot be delivered are parked in a bounded
//! overflow buffer and resent after the next successful send. Submitting a
//! line never blocks and never fails.

mod batch;
mod builder;
pub mod catcher;
mod config;
mod error;
mod file_config;
pub mod log_compat;
mod log_line;
mod rate_limited_warner;
pub mod reporter;
mod shipper;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use batch::{Batch, BatchRef};
pub use builder::ShipperBuilder;
pub use catcher::CatcherSession;
pub use config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_INTERVAL, DEFAULT_WRITE_TIMEOUT, ShipperConfig};
pub use error::{CatcherError, ShipError, ShipperBuildError};
pub use log_compat::ShippingLogger;
pub use log_line::LogLine;
pub use rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner};
pub use reporter::{DIAGNOSTIC_TARGET, FallbackReporter, LogReporter};
pub use shipper::{Backlog, DEFAULT_OVERFLOW_CAPACITY, FemtoShipper, OverflowBuffer, StatsSnapshot};
pub use transport::{CollectorEndpoint, Connector, TcpConnector};
