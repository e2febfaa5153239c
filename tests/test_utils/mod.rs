//! Shared helpers for integration tests.
//!
//! [`TestCollector`] runs a real TCP collector on a loopback port, validating
//! each shipper handshake with [`CatcherSession`] and recording the batches it
//! receives.

#![allow(dead_code)]

use std::{
    net::{SocketAddr, TcpListener},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use femtoshipper::{
    Batch, CatcherSession, FallbackReporter,
    transport::{DEFAULT_MAX_FRAME_SIZE, DEFAULT_MAX_SKEW},
};
use log::Level;

#[derive(Default)]
struct Received {
    batches: Mutex<Vec<Batch>>,
    rejections: Mutex<Vec<String>>,
    connections: AtomicUsize,
}

/// Loopback collector recording every authenticated batch.
pub struct TestCollector {
    addr: SocketAddr,
    received: Arc<Received>,
}

impl TestCollector {
    /// Start a collector on an ephemeral port.
    pub fn start(secret: &str) -> Self {
        Self::bind(secret, 0)
    }

    /// Start a collector on `port`, which may be zero for any free port.
    pub fn bind(secret: &str, port: u16) -> Self {
        Self::spawn(secret, port, None)
    }

    /// Start a collector that closes its first connection after receiving
    /// `batches` batches. Later connections are served normally.
    pub fn hanging_up_first_after(secret: &str, batches: usize) -> Self {
        Self::spawn(secret, 0, Some(batches))
    }

    fn spawn(secret: &str, port: u16, first_limit: Option<usize>) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", port)).expect("bind collector");
        let addr = listener.local_addr().expect("collector address");
        let received = Arc::new(Received::default());
        let shared = Arc::clone(&received);
        let secret = secret.to_owned();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let shared = Arc::clone(&shared);
                let secret = secret.clone();
                thread::spawn(move || serve(stream, &secret, &shared, first_limit));
            }
        });
        Self { addr, received }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.received.batches.lock().expect("batches lock").clone()
    }

    /// Every received line in arrival order.
    pub fn lines(&self) -> Vec<String> {
        self.batches()
            .into_iter()
            .flat_map(|b| b.lines.into_iter().map(|l| l.into_string()))
            .collect()
    }

    pub fn rejections(&self) -> Vec<String> {
        self.received.rejections.lock().expect("rejections lock").clone()
    }

    pub fn connections(&self) -> usize {
        self.received.connections.load(Ordering::SeqCst)
    }
}

fn serve(
    stream: std::net::TcpStream,
    secret: &str,
    received: &Received,
    first_limit: Option<usize>,
) {
    let index = received.connections.fetch_add(1, Ordering::SeqCst);
    let limit = first_limit.filter(|_| index == 0).unwrap_or(usize::MAX);
    let mut session =
        match CatcherSession::accept(stream, secret, DEFAULT_MAX_SKEW, DEFAULT_MAX_FRAME_SIZE) {
            Ok(session) => session,
            Err(err) => {
                received
                    .rejections
                    .lock()
                    .expect("rejections lock")
                    .push(err.to_string());
                return;
            }
        };
    for _ in 0..limit {
        let Ok(Some(batch)) = session.next_batch() else {
            break;
        };
        received.batches.lock().expect("batches lock").push(batch);
    }
}

/// Return a loopback port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind throwaway listener");
    listener.local_addr().expect("throwaway address").port()
}

/// Reporter recording diagnostics for assertions.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    entries: Arc<Mutex<Vec<(Level, String)>>>,
}

impl RecordingReporter {
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .expect("reporter lock")
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl FallbackReporter for RecordingReporter {
    fn report(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .expect("reporter lock")
            .push((level, message.to_owned()));
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
