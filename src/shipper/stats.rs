//! Counters describing shipper activity.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Point-in-time copy of the shipper counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Batches written to the collector, including backlog resends.
    pub batches_sent: u64,
    pub lines_sent: u64,
    /// Send attempts that ended in a transport failure.
    pub failed_sends: u64,
    /// Lines evicted from the overflow buffer.
    pub lines_purged: u64,
    /// Lines currently parked for retry.
    pub backlog: usize,
}

#[derive(Debug, Default)]
pub(crate) struct ShipperStats {
    batches_sent: AtomicU64,
    lines_sent: AtomicU64,
    failed_sends: AtomicU64,
    lines_purged: AtomicU64,
    backlog: AtomicUsize,
}

impl ShipperStats {
    pub(crate) fn record_sent(&self, lines: usize) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
        self.lines_sent.fetch_add(lines as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed_sends.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_purge(&self, lines: usize) {
        self.lines_purged.fetch_add(lines as u64, Ordering::Relaxed);
    }

    pub(crate) fn set_backlog(&self, lines: usize) {
        self.backlog.store(lines, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            lines_sent: self.lines_sent.load(Ordering::Relaxed),
            failed_sends: self.failed_sends.load(Ordering::Relaxed),
            lines_purged: self.lines_purged.load(Ordering::Relaxed),
            backlog: self.backlog.load(Ordering::Relaxed),
        }
    }
}
