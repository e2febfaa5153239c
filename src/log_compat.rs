//! Compatibility bridge for the Rust `log` crate.
//!
//! [`ShippingLogger`] is a `log::Log` implementation that writes each record
//! to an optional local logger and submits it to a [`FemtoShipper`] as one
//! line. Records on [`DIAGNOSTIC_TARGET`] are only written locally, so the
//! shipper's own failure reports never re-enter its network path.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::{reporter::DIAGNOSTIC_TARGET, shipper::FemtoShipper};

/// Adapter forwarding `log` records to a shipper.
pub struct ShippingLogger {
    shipper: Arc<FemtoShipper>,
    local: Option<Box<dyn Log>>,
    level: LevelFilter,
}

impl ShippingLogger {
    /// Ship records at or above `level`.
    pub fn new(shipper: Arc<FemtoShipper>, level: LevelFilter) -> Self {
        Self {
            shipper,
            local: None,
            level,
        }
    }

    /// Also write every enabled record, diagnostics included, to `local`.
    pub fn with_local(mut self, local: Box<dyn Log>) -> Self {
        self.local = Some(local);
        self
    }

    /// Install as the global `log` logger and raise the max level to match.
    ///
    /// Fails if another global logger is already set.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

/// Render a record as a single shipped line.
pub fn format_record(record: &Record<'_>) -> String {
    format!(
        "{} {:<5} {} {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        record.level(),
        record.target(),
        record.args()
    )
}

impl Log for ShippingLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(local) = &self.local {
            local.log(record);
        }
        if record.target() != DIAGNOSTIC_TARGET {
            self.shipper.submit(format_record(record));
        }
    }

    fn flush(&self) {
        if let Some(local) = &self.local {
            local.flush();
        }
    }
}

impl std::fmt::Debug for ShippingLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippingLogger")
            .field("shipper", &self.shipper)
            .field("has_local", &self.local.is_some())
            .field("level", &self.level)
            .finish()
    }
}
