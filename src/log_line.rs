//! Opaque log line representation handed to the shipper.
//!
//! Upstream loggers format records themselves and pass the finished bytes in
//! one line at a time. The shipper never parses a line; it only needs a string
//! form because the collector protocol carries lines as strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One already-formatted log record.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD when the line is
/// created. A line is immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogLine(String);

impl LogLine {
    /// Build a line from raw bytes, returning `None` for an empty buffer.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(Self(String::from_utf8_lossy(bytes).into_owned()))
    }

    /// Borrow the line contents.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the line in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for LogLine {
    fn from(line: String) -> Self {
        Self(line)
    }
}

impl From<&str> for LogLine {
    fn from(line: &str) -> Self {
        Self(line.to_owned())
    }
}

impl AsRef<str> for LogLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
