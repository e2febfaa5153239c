//! Network send path for completed intervals.
//!
//! Each interval's snapshot is flushed on its own thread. Attempts share one
//! lazily established connection guarded by a mutex that is held only while
//! connecting and writing; the overflow buffer has its own lock so backlog
//! bookkeeping never waits on the network.
//!
//! A flush attempt moves through connecting, sending, and then sent or
//! failed. Lines are sent in consecutive chunks that each fit one frame. The
//! first failed chunk and everything after it are parked in the overflow
//! buffer. A successful flush is followed by one pass over everything parked,
//! acknowledging each chunk as it is delivered and stopping at the first
//! failure.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use log::Level;
use parking_lot::Mutex;

use crate::{
    batch::{BatchRef, Chunk, plan_chunks},
    error::ShipError,
    log_line::LogLine,
    reporter::FallbackReporter,
    transport::{BatchSink, Connector},
};

use super::{overflow::OverflowBuffer, stats::ShipperStats};

/// Result of flushing one interval's lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The lines reached the collector.
    Sent,
    /// The lines were parked in the overflow buffer.
    Failed,
}

pub struct FlushManager<C: Connector> {
    connector: C,
    connection: Mutex<Option<C::Connection>>,
    overflow: Mutex<OverflowBuffer>,
    source: String,
    interval: Duration,
    max_frame_size: usize,
    reporter: Arc<dyn FallbackReporter>,
    stats: Arc<ShipperStats>,
}

impl<C: Connector> FlushManager<C> {
    pub(crate) fn new(
        connector: C,
        source: String,
        interval: Duration,
        max_frame_size: usize,
        overflow_capacity: usize,
        reporter: Arc<dyn FallbackReporter>,
        stats: Arc<ShipperStats>,
    ) -> Self {
        Self {
            connector,
            connection: Mutex::new(None),
            overflow: Mutex::new(OverflowBuffer::new(overflow_capacity)),
            source,
            interval,
            max_frame_size,
            reporter,
            stats,
        }
    }

    pub(crate) fn reporter(&self) -> &dyn FallbackReporter {
        self.reporter.as_ref()
    }

    /// Send `lines` in frame-sized chunks, parking the unsent remainder on
    /// failure and retrying the backlog on success.
    pub fn flush(&self, mut lines: Vec<LogLine>) -> FlushOutcome {
        for chunk in plan_chunks(&self.source, &lines, self.max_frame_size) {
            match chunk {
                Chunk::Oversized(index) => self.drop_oversized(&lines[index]),
                Chunk::Lines(range) => {
                    if self.send(&lines[range.clone()]).is_err() {
                        self.park(lines.split_off(range.start));
                        return FlushOutcome::Failed;
                    }
                }
            }
        }
        self.retry_backlog();
        FlushOutcome::Sent
    }

    #[cfg(test)]
    pub(crate) fn backlog_len(&self) -> usize {
        self.overflow.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn backlog_lines(&self) -> Vec<LogLine> {
        self.overflow.lock().lines().cloned().collect()
    }

    fn send(&self, lines: &[LogLine]) -> Result<(), ShipError> {
        let mut guard = self.connection.lock();
        let mut connection = match guard.take() {
            Some(connection) => connection,
            None => match self.connector.connect() {
                Ok(connection) => connection,
                Err(err) => {
                    drop(guard);
                    self.stats.record_failure();
                    self.reporter.report(
                        Level::Error,
                        &format!("Could not connect to {}: {err}", self.connector.describe()),
                    );
                    return Err(err);
                }
            },
        };

        let batch = BatchRef::new(&self.source, lines, SystemTime::now(), self.interval);
        let result = connection.send_batch(&batch);
        match &result {
            Err(err) if !err.connection_intact() => {}
            _ => *guard = Some(connection),
        }
        drop(guard);

        match result {
            Ok(()) => {
                self.stats.record_sent(lines.len());
                self.reporter
                    .report(Level::Debug, &format!("Sent {} lines", lines.len()));
                Ok(())
            }
            Err(err) => {
                self.stats.record_failure();
                self.reporter.report(
                    Level::Error,
                    &format!("Error sending to {}: {err}", self.connector.describe()),
                );
                Err(err)
            }
        }
    }

    fn park(&self, lines: Vec<LogLine>) {
        let purged = {
            let mut overflow = self.overflow.lock();
            let purged = overflow.append(lines);
            self.stats.set_backlog(overflow.len());
            purged
        };
        if purged > 0 {
            self.stats.record_purge(purged);
            self.reporter
                .report(Level::Warn, &format!("Purging {purged} unsent lines"));
        }
    }

    fn retry_backlog(&self) {
        let Some(backlog) = self.overflow.lock().snapshot() else {
            return;
        };
        for chunk in plan_chunks(&self.source, &backlog.lines, self.max_frame_size) {
            let last = match chunk {
                Chunk::Oversized(index) => {
                    self.drop_oversized(&backlog.lines[index]);
                    index
                }
                Chunk::Lines(range) => {
                    if self.send(&backlog.lines[range.clone()]).is_err() {
                        return;
                    }
                    range.end - 1
                }
            };
            let mut overflow = self.overflow.lock();
            overflow.acknowledge(backlog.seq_at(last));
            self.stats.set_backlog(overflow.len());
        }
    }

    fn drop_oversized(&self, line: &LogLine) {
        self.stats.record_purge(1);
        self.reporter.report(
            Level::Warn,
            &format!(
                "Dropping {}-byte line that exceeds the {}-byte frame limit",
                line.len(),
                self.max_frame_size
            ),
        );
    }
}
