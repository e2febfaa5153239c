//! Bounded retry queue for lines whose batch failed to send.
//!
//! Lines are kept oldest first. Appending past capacity evicts from the front
//! and reports how many lines were purged. Every parked line carries a
//! sequence number so a successful resend can acknowledge exactly the lines
//! it carried, even if another flush parked more lines in the meantime.

use std::collections::VecDeque;

use crate::log_line::LogLine;

/// Default number of lines retained for retry.
pub const DEFAULT_OVERFLOW_CAPACITY: usize = 10_000;

/// Snapshot of the parked lines taken for an opportunistic resend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Backlog {
    pub lines: Vec<LogLine>,
    /// Sequence number of the oldest line in `lines`.
    pub first: u64,
    /// Sequence number of the newest line in `lines`.
    pub through: u64,
}

impl Backlog {
    /// Sequence number of `lines[index]`.
    pub fn seq_at(&self, index: usize) -> u64 {
        self.first + index as u64
    }
}

#[derive(Debug)]
pub struct OverflowBuffer {
    entries: VecDeque<(u64, LogLine)>,
    capacity: usize,
    next_seq: u64,
}

impl OverflowBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            next_seq: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Park `lines` behind the existing entries.
    ///
    /// Returns the number of oldest lines evicted to stay within capacity.
    pub fn append(&mut self, lines: impl IntoIterator<Item = LogLine>) -> usize {
        for line in lines {
            self.entries.push_back((self.next_seq, line));
            self.next_seq += 1;
        }
        let excess = self.entries.len().saturating_sub(self.capacity);
        self.entries.drain(..excess);
        excess
    }

    /// Copy out every parked line, or `None` when nothing is parked.
    pub fn snapshot(&self) -> Option<Backlog> {
        let (first, _) = self.entries.front()?;
        let (through, _) = self.entries.back()?;
        Some(Backlog {
            lines: self.entries.iter().map(|(_, line)| line.clone()).collect(),
            first: *first,
            through: *through,
        })
    }

    /// Drop every line up to and including sequence `through`.
    ///
    /// Returns the number of lines removed.
    pub fn acknowledge(&mut self, through: u64) -> usize {
        let delivered = self
            .entries
            .iter()
            .take_while(|(seq, _)| *seq <= through)
            .count();
        self.entries.drain(..delivered);
        delivered
    }

    /// Iterate over the parked lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.entries.iter().map(|(_, line)| line)
    }
}

impl Default for OverflowBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_OVERFLOW_CAPACITY)
    }
}
