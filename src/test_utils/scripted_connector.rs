//! In-memory connector whose connect and send results are scripted by tests.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;

use crate::{
    batch::{Batch, BatchRef},
    error::ShipError,
    transport::{BatchSink, Connector, FrameEncoder},
};

#[derive(Default)]
struct ScriptState {
    refuse_connect: AtomicBool,
    fail_sends: AtomicBool,
    success_budget: Mutex<Option<usize>>,
    frame_limit: Mutex<Option<usize>>,
    send_delay_ms: AtomicUsize,
    connects: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delivered: Mutex<Vec<Batch>>,
}

/// Connector recording every delivered batch.
///
/// Clones share state, so a test keeps one clone to flip failure modes and
/// inspect deliveries while the shipper owns another.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    state: Arc<ScriptState>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent connection attempts fail.
    pub fn refuse_connect(&self, refuse: bool) {
        self.state.refuse_connect.store(refuse, Ordering::SeqCst);
    }

    /// Make subsequent batch writes fail.
    pub fn fail_sends(&self, fail: bool) {
        self.state.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Let the next `successes` sends through, then fail every later send.
    pub fn fail_sends_after(&self, successes: usize) {
        *self.state.success_budget.lock() = Some(successes);
    }

    /// Reject batches whose encoded frame would exceed `max` bytes, the way
    /// a real connection does before writing anything.
    pub fn limit_frames(&self, max: usize) {
        *self.state.frame_limit.lock() = Some(max);
    }

    /// Sleep for `delay` inside every send.
    pub fn delay_sends(&self, delay: Duration) {
        let ms = usize::try_from(delay.as_millis()).unwrap_or(usize::MAX);
        self.state.send_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Highest number of sends observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<Batch> {
        self.state.delivered.lock().clone()
    }

    /// Lines of each delivered batch, as plain strings.
    pub fn delivered_lines(&self) -> Vec<Vec<String>> {
        self.delivered()
            .into_iter()
            .map(|b| b.lines.into_iter().map(|l| l.into_string()).collect())
            .collect()
    }
}

pub struct ScriptedConnection {
    state: Arc<ScriptState>,
}

impl ScriptedConnection {
    fn take_budget(&self) -> bool {
        let mut budget = self.state.success_budget.lock();
        match budget.as_mut() {
            None => true,
            Some(0) => false,
            Some(remaining) => {
                *remaining -= 1;
                true
            }
        }
    }
}

impl BatchSink for ScriptedConnection {
    fn send_batch(&mut self, batch: &BatchRef<'_>) -> Result<(), ShipError> {
        let limit = *self.state.frame_limit.lock();
        if let Some(max) = limit {
            FrameEncoder::new(io::sink(), max)
                .frame(batch)
                .map_err(ShipError::Frame)?;
        }
        let running = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let delay = self.state.send_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay as u64));
        }
        let result = if self.state.fail_sends.load(Ordering::SeqCst) || !self.take_budget() {
            Err(ShipError::Encode(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "scripted send failure",
            )))
        } else {
            self.state.delivered.lock().push(batch.to_owned_batch());
            Ok(())
        };
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl Connector for ScriptedConnector {
    type Connection = ScriptedConnection;

    fn connect(&self) -> Result<Self::Connection, ShipError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        if self.state.refuse_connect.load(Ordering::SeqCst) {
            return Err(ShipError::Connect {
                endpoint: self.describe(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "scripted refusal"),
            });
        }
        Ok(ScriptedConnection {
            state: Arc::clone(&self.state),
        })
    }

    fn describe(&self) -> String {
        "scripted-collector:0".into()
    }
}
