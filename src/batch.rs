//! Batch records exchanged with the collector.
//!
//! A batch groups every line ingested during one reporting interval together
//! with the source identity and the interval start. The shipper sends a
//! borrowed [`BatchRef`] so the lines stay available for the overflow buffer
//! if the send fails; collectors decode the owned [`Batch`].

use std::{
    ops::Range,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::log_line::LogLine;

/// Decoded batch as seen by a collector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub source: String,
    pub interval_start: DateTime<Utc>,
    pub lines: Vec<LogLine>,
}

/// Borrowed view of a batch used on the send path.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct BatchRef<'a> {
    pub source: &'a str,
    pub interval_start: DateTime<Utc>,
    pub lines: &'a [LogLine],
}

impl<'a> BatchRef<'a> {
    /// Build a batch whose interval started `interval` before `now`.
    pub fn new(source: &'a str, lines: &'a [LogLine], now: SystemTime, interval: Duration) -> Self {
        let start = now.checked_sub(interval).unwrap_or(UNIX_EPOCH);
        Self {
            source,
            interval_start: DateTime::<Utc>::from(start),
            lines,
        }
    }

    pub fn to_owned_batch(&self) -> Batch {
        Batch {
            source: self.source.to_owned(),
            interval_start: self.interval_start,
            lines: self.lines.to_vec(),
        }
    }
}

/// Upper bound on the encoded size of a batch with no lines and an empty
/// source: map and array headers, the three field names, the timestamp, and
/// the source string header.
const BATCH_OVERHEAD: usize = 96;
/// Upper bound on the MessagePack string header preceding each line.
const LINE_OVERHEAD: usize = 5;

/// One frame-sized piece of a line list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Chunk {
    /// Consecutive lines that fit together in one frame.
    Lines(Range<usize>),
    /// A line that cannot fit in any frame on its own.
    Oversized(usize),
}

/// Split `lines` into consecutive chunks whose encoded batches stay within
/// `max_frame_size`.
///
/// Sizes are upper bounds, so a planned chunk never fails the frame check.
pub(crate) fn plan_chunks(source: &str, lines: &[LogLine], max_frame_size: usize) -> Vec<Chunk> {
    let budget = max_frame_size.saturating_sub(BATCH_OVERHEAD + source.len());
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut used = 0;
    for (index, line) in lines.iter().enumerate() {
        let cost = line.len() + LINE_OVERHEAD;
        if cost > budget {
            if start < index {
                chunks.push(Chunk::Lines(start..index));
            }
            chunks.push(Chunk::Oversized(index));
            start = index + 1;
            used = 0;
            continue;
        }
        if used + cost > budget {
            chunks.push(Chunk::Lines(start..index));
            start = index;
            used = 0;
        }
        used += cost;
    }
    if start < lines.len() {
        chunks.push(Chunk::Lines(start..lines.len()));
    }
    chunks
}
