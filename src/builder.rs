//! Builder for [`FemtoShipper`](crate::FemtoShipper).
//!
//! Collects the collector address, credentials, and tuning knobs, validates
//! them, and produces a [`ShipperConfig`]. Unset options fall back to the
//! defaults in [`crate::config`].

use std::{fmt, sync::Arc, time::Duration};

use crate::{
    config::ShipperConfig,
    error::ShipperBuildError,
    reporter::{FallbackReporter, LogReporter},
    shipper::FemtoShipper,
    transport::CollectorEndpoint,
};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ShipperBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

fn require_text(value: Option<&str>, field: &str) -> Result<String, ShipperBuildError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.to_owned()),
        Some(_) => Err(ShipperBuildError::InvalidConfig(format!(
            "{field} must not be empty"
        ))),
        None => Err(ShipperBuildError::InvalidConfig(format!(
            "shipper requires a {field}"
        ))),
    }
}

/// Builder for constructing [`FemtoShipper`] instances.
#[derive(Clone, Default)]
pub struct ShipperBuilder {
    host: Option<String>,
    port: Option<u16>,
    secret: Option<String>,
    source: Option<String>,
    interval_ms: Option<u64>,
    overflow_capacity: Option<usize>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
    max_frame_size: Option<usize>,
    warn_interval_ms: Option<u64>,
    reporter: Option<Arc<dyn FallbackReporter>>,
}

impl ShipperBuilder {
    /// Create a new builder with no collector configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ship to the collector listening on `host:port`.
    pub fn with_collector(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self
    }

    /// Shared secret used to sign handshake tokens.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Identity recorded in every batch, usually the host name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    option_setter!(
        #[doc = "Set the reporting interval in milliseconds."]
        with_interval_ms,
        interval_ms,
        u64
    );
    option_setter!(
        #[doc = "Set how many unsent lines the overflow buffer retains."]
        with_overflow_capacity,
        overflow_capacity,
        usize
    );
    option_setter!(with_connect_timeout_ms, connect_timeout_ms, u64);
    option_setter!(with_write_timeout_ms, write_timeout_ms, u64);
    option_setter!(with_max_frame_size, max_frame_size, usize);
    option_setter!(with_warn_interval_ms, warn_interval_ms, u64);

    /// Route shipper diagnostics through `reporter` instead of the `log` facade.
    pub fn with_reporter(mut self, reporter: Arc<dyn FallbackReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    fn validate_numbers(&self) -> Result<(), ShipperBuildError> {
        if let Some(port) = self.port {
            ensure_positive!(port, "port")?;
        }
        if let Some(interval) = self.interval_ms {
            ensure_positive!(interval, "interval_ms")?;
        }
        if let Some(capacity) = self.overflow_capacity {
            ensure_positive!(capacity, "overflow_capacity")?;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.write_timeout_ms {
            ensure_positive!(timeout, "write_timeout_ms")?;
        }
        if let Some(size) = self.max_frame_size {
            ensure_positive!(size, "max_frame_size")?;
        }
        Ok(())
    }

    fn apply_optional_fields(&self, config: &mut ShipperConfig) {
        if let Some(interval) = self.interval_ms {
            config.interval = Duration::from_millis(interval);
        }
        if let Some(capacity) = self.overflow_capacity {
            config.overflow_capacity = capacity;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(timeout);
        }
        if let Some(timeout) = self.write_timeout_ms {
            config.write_timeout = Duration::from_millis(timeout);
        }
        if let Some(size) = self.max_frame_size {
            config.max_frame_size = size;
        }
        if let Some(interval) = self.warn_interval_ms {
            config.warn_interval = Duration::from_millis(interval);
        }
    }

    /// Validate the collected options and produce a configuration.
    pub fn build_config(&self) -> Result<ShipperConfig, ShipperBuildError> {
        let host = require_text(self.host.as_deref(), "host")?;
        let port = self.port.ok_or_else(|| {
            ShipperBuildError::InvalidConfig("shipper requires a port".into())
        })?;
        let secret = require_text(self.secret.as_deref(), "secret")?;
        let source = require_text(self.source.as_deref(), "source")?;
        self.validate_numbers()?;
        let mut config = ShipperConfig::new(CollectorEndpoint::new(host, port), secret, source);
        self.apply_optional_fields(&mut config);
        Ok(config)
    }

    /// Validate the options and start a shipper.
    pub fn build(&self) -> Result<FemtoShipper, ShipperBuildError> {
        let config = self.build_config()?;
        let reporter = self
            .reporter
            .clone()
            .unwrap_or_else(|| Arc::new(LogReporter));
        FemtoShipper::with_reporter(config, reporter)
    }
}

impl fmt::Debug for ShipperBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShipperBuilder")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("source", &self.source)
            .field("interval_ms", &self.interval_ms)
            .field("overflow_capacity", &self.overflow_capacity)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("write_timeout_ms", &self.write_timeout_ms)
            .field("max_frame_size", &self.max_frame_size)
            .field("warn_interval_ms", &self.warn_interval_ms)
            .field("custom_reporter", &self.reporter.is_some())
            .finish()
    }
}
