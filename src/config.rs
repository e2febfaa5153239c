//! Configuration consumed by [`FemtoShipper`](crate::FemtoShipper).
//!
//! [`ShipperBuilder`](crate::ShipperBuilder) validates user input and
//! produces these values; the shipper only reads them.

use std::{fmt, time::Duration};

use crate::{
    rate_limited_warner::DEFAULT_WARN_INTERVAL,
    shipper::DEFAULT_OVERFLOW_CAPACITY,
    transport::{CollectorEndpoint, DEFAULT_MAX_FRAME_SIZE, SocketOptions},
};

/// Default period between flush attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
/// Default connection timeout applied when dialling the collector.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default write timeout applied to collector sockets.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct ShipperConfig {
    pub endpoint: CollectorEndpoint,
    pub secret: String,
    pub interval: Duration,
    /// Identity of this process as recorded in every batch.
    pub source: String,
    pub overflow_capacity: usize,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub max_frame_size: usize,
    pub warn_interval: Duration,
}

impl ShipperConfig {
    /// Configuration for `endpoint` with default interval, limits, and timeouts.
    pub fn new(
        endpoint: CollectorEndpoint,
        secret: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            secret: secret.into(),
            interval: DEFAULT_INTERVAL,
            source: source.into(),
            overflow_capacity: DEFAULT_OVERFLOW_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }

    /// Override the reporting interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn socket_options(&self) -> SocketOptions {
        SocketOptions {
            connect_timeout: self.connect_timeout,
            write_timeout: self.write_timeout,
            max_frame_size: self.max_frame_size,
        }
    }
}

impl fmt::Debug for ShipperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShipperConfig")
            .field("endpoint", &self.endpoint)
            .field("secret", &"[REDACTED]")
            .field("interval", &self.interval)
            .field("source", &self.source)
            .field("overflow_capacity", &self.overflow_capacity)
            .field("connect_timeout", &self.connect_timeout)
            .field("write_timeout", &self.write_timeout)
            .field("max_frame_size", &self.max_frame_size)
            .field("warn_interval", &self.warn_interval)
            .finish()
    }
}
