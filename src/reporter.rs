//! Local fallback reporting for shipper diagnostics.
//!
//! Connection failures, purges, and send confirmations are reported through
//! an injected [`FallbackReporter`] rather than through the shipper itself.
//! The default [`LogReporter`] writes to the `log` facade under
//! [`DIAGNOSTIC_TARGET`]; [`crate::log_compat::ShippingLogger`] keeps that
//! target off the network path so diagnostics cannot recurse.

use log::Level;

/// `log` target used for every shipper diagnostic.
pub const DIAGNOSTIC_TARGET: &str = "femtoshipper::diagnostics";

/// Sink for shipper-internal diagnostics.
pub trait FallbackReporter: Send + Sync {
    fn report(&self, level: Level, message: &str);
}

/// Reporter forwarding diagnostics to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl FallbackReporter for LogReporter {
    fn report(&self, level: Level, message: &str) {
        log::log!(target: DIAGNOSTIC_TARGET, level, "{message}");
    }
}
