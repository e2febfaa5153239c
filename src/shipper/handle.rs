//! Public shipper type exported by the crate.

use std::{
    io::{self, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};

use crossbeam_channel::Sender;
use log::Level;
use parking_lot::Mutex;

use crate::{
    config::ShipperConfig,
    error::ShipperBuildError,
    log_line::LogLine,
    rate_limited_warner::RateLimitedWarner,
    reporter::{FallbackReporter, LogReporter},
    transport::{Connector, TcpConnector},
};

use super::{
    flush::FlushManager,
    ingest::{IngestCommand, spawn_ingest},
    stats::{ShipperStats, StatsSnapshot},
};

const FLUSH_ACK_TIMEOUT: Duration = Duration::from_secs(1);

/// Handle forwarding log lines to a remote collector in interval batches.
///
/// `submit` only enqueues; batching, connecting, and retrying happen on
/// background threads. Lines that cannot be delivered are parked in a bounded
/// overflow buffer and resent after the next successful send.
pub struct FemtoShipper {
    tx: Sender<IngestCommand>,
    closed: AtomicBool,
    shutdown: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    warner: RateLimitedWarner,
    reporter: Arc<dyn FallbackReporter>,
    stats: Arc<ShipperStats>,
}

impl FemtoShipper {
    /// Start a shipper for `config` reporting through the `log` facade.
    pub fn new(config: ShipperConfig) -> Result<Self, ShipperBuildError> {
        Self::with_reporter(config, Arc::new(LogReporter))
    }

    /// Start a shipper dialling the configured collector over TCP.
    pub fn with_reporter(
        config: ShipperConfig,
        reporter: Arc<dyn FallbackReporter>,
    ) -> Result<Self, ShipperBuildError> {
        let connector =
            TcpConnector::new(config.endpoint.clone(), config.secret.clone(), config.socket_options());
        Self::with_connector(config, connector, reporter)
    }

    /// Start a shipper using a custom connector.
    pub fn with_connector<C: Connector>(
        config: ShipperConfig,
        connector: C,
        reporter: Arc<dyn FallbackReporter>,
    ) -> Result<Self, ShipperBuildError> {
        let stats = Arc::new(ShipperStats::default());
        let manager = Arc::new(FlushManager::new(
            connector,
            config.source,
            config.interval,
            config.max_frame_size,
            config.overflow_capacity,
            Arc::clone(&reporter),
            Arc::clone(&stats),
        ));
        let worker = spawn_ingest(manager, config.interval)?;
        Ok(Self {
            tx: worker.tx,
            closed: AtomicBool::new(false),
            shutdown: Mutex::new(Some(worker.shutdown)),
            handle: Mutex::new(Some(worker.handle)),
            warner: RateLimitedWarner::new(config.warn_interval),
            reporter,
            stats,
        })
    }

    /// Queue one formatted log line for the current interval.
    ///
    /// Never blocks and never fails. Empty buffers are ignored; lines
    /// submitted after [`close`](Self::close) are dropped.
    pub fn submit(&self, line: impl AsRef<[u8]>) {
        let Some(line) = LogLine::from_bytes(line.as_ref()) else {
            return;
        };
        if self.closed.load(Ordering::Acquire)
            || self.tx.send(IngestCommand::Line(line)).is_err()
        {
            self.record_drop();
        }
    }

    /// Hand the lines pending for this interval to a flush thread now.
    ///
    /// Returns `false` once the shipper is closed or if the ingest thread does
    /// not acknowledge in time. The send itself completes asynchronously.
    pub fn flush(&self) -> bool {
        if self.is_closed() {
            return false;
        }
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if self.tx.send(IngestCommand::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv_timeout(FLUSH_ACK_TIMEOUT).is_ok()
    }

    /// Stop ingestion and wait for the ingest thread to exit.
    ///
    /// Lines not yet handed to a flush thread are abandoned. Flushes already
    /// in flight finish on their own.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        drop(self.shutdown.lock().take());
        let handle = self.handle.lock().take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            self.reporter
                .report(Level::Error, "FemtoShipper: ingest thread panicked");
        }
        self.warner.flush(|count| {
            self.reporter.report(
                Level::Warn,
                &format!("FemtoShipper dropped {count} lines submitted after close"),
            );
        });
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn record_drop(&self) {
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            self.reporter.report(
                Level::Warn,
                &format!("FemtoShipper dropped {count} lines submitted after close"),
            );
        });
    }
}

impl Write for &FemtoShipper {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.submit(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Write for FemtoShipper {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.submit(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for FemtoShipper {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for FemtoShipper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FemtoShipper")
            .field("closed", &self.is_closed())
            .field("stats", &self.stats())
            .finish()
    }
}
