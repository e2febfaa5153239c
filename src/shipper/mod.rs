//! Interval batching shipper.
//!
//! This module defines [`FemtoShipper`], which accumulates submitted log lines
//! on an ingest thread and, every reporting interval, hands the batch to a
//! flush thread. Flush threads share one collector connection, reconnect
//! lazily after failures, and park undelivered lines in a bounded
//! [`OverflowBuffer`] that is resent after the next successful send.

mod flush;
mod handle;
mod ingest;
mod overflow;
mod stats;


pub use handle::FemtoShipper;
pub use overflow::{Backlog, DEFAULT_OVERFLOW_CAPACITY, OverflowBuffer};
pub use stats::StatsSnapshot;
