//! A reporter that accumulates diagnostics in memory for test assertions.
//!
//! Shared by the shipper and log bridge tests so each module does not need
//! its own copy of the same boilerplate.

use std::sync::Arc;

use log::Level;
use parking_lot::Mutex;

use crate::reporter::FallbackReporter;

/// Reporter that stores every diagnostic it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingReporter {
    entries: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all diagnostics received so far.
    pub fn collected(&self) -> Vec<(Level, String)> {
        self.entries.lock().clone()
    }

    /// Messages reported at `level`, oldest first.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl FallbackReporter for CollectingReporter {
    fn report(&self, level: Level, message: &str) {
        self.entries.lock().push((level, message.to_owned()));
    }
}
