//! Ingest thread accumulating lines between reporting ticks.
//!
//! The thread is the only owner of the pending line buffer. It multiplexes
//! producer submissions, the interval ticker, and the shutdown signal, and
//! never touches the network: each tick swaps the pending buffer for a fresh
//! one and hands the snapshot to a dedicated flush thread.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, select, tick, unbounded};
use log::Level;

use crate::{log_line::LogLine, transport::Connector};

use super::flush::FlushManager;

const INITIAL_PENDING_CAPACITY: usize = 200;

/// Commands processed by the ingest thread.
#[derive(Debug)]
pub(crate) enum IngestCommand {
    Line(LogLine),
    /// Hand the pending lines to a flush thread now; acknowledged once the
    /// flush thread has been scheduled.
    Flush(Sender<()>),
}

pub(crate) struct IngestWorker {
    pub(crate) tx: Sender<IngestCommand>,
    pub(crate) shutdown: Sender<()>,
    pub(crate) handle: JoinHandle<()>,
}

pub(crate) fn spawn_ingest<C: Connector>(
    manager: Arc<FlushManager<C>>,
    interval: Duration,
) -> std::io::Result<IngestWorker> {
    let (tx, rx) = unbounded();
    let (shutdown, shutdown_rx) = crossbeam_channel::bounded(0);
    let handle = thread::Builder::new()
        .name("femtoshipper-ingest".into())
        .spawn(move || ingest_loop(rx, shutdown_rx, manager, interval))?;
    Ok(IngestWorker {
        tx,
        shutdown,
        handle,
    })
}

fn ingest_loop<C: Connector>(
    rx: Receiver<IngestCommand>,
    shutdown: Receiver<()>,
    manager: Arc<FlushManager<C>>,
    interval: Duration,
) {
    let ticker = tick(interval);
    let mut pending: Vec<LogLine> = Vec::with_capacity(INITIAL_PENDING_CAPACITY);
    loop {
        select! {
            recv(shutdown) -> _ => return,
            recv(ticker) -> _ => dispatch(&manager, &mut pending),
            recv(rx) -> cmd => match cmd {
                Ok(IngestCommand::Line(line)) => pending.push(line),
                Ok(IngestCommand::Flush(ack)) => {
                    dispatch(&manager, &mut pending);
                    let _ = ack.send(());
                }
                Err(_) => return,
            },
        }
    }
}

/// Snapshot-and-reset the pending lines and flush them off-thread.
fn dispatch<C: Connector>(manager: &Arc<FlushManager<C>>, pending: &mut Vec<LogLine>) {
    if pending.is_empty() {
        return;
    }
    let capacity = pending.len().max(INITIAL_PENDING_CAPACITY);
    let lines = std::mem::replace(pending, Vec::with_capacity(capacity));
    let count = lines.len();
    let unit = Arc::clone(manager);
    let spawned = thread::Builder::new()
        .name("femtoshipper-flush".into())
        .spawn(move || {
            unit.flush(lines);
        });
    if let Err(err) = spawned {
        manager.reporter().report(
            Level::Error,
            &format!("Could not start flush thread: {err}; dropped {count} lines"),
        );
    }
}
