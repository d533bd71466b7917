//! Parsed access-log record

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Column names of a record, in insertion order
pub const FIELD_NAMES: [&str; 7] = ["ip", "date", "method", "url", "status", "bytes", "duration"];

/// One parsed access-log entry
///
/// Every field is populated by the parser; a line that cannot fill all
/// seven fields never becomes a `LogRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Client address in dotted textual form (not validated as an address)
    pub ip: String,

    /// Request time with the offset it was logged in
    pub date: DateTime<FixedOffset>,

    /// First token of the request line
    pub method: String,

    /// Second token of the request line
    pub url: String,

    /// Response status code
    pub status: u16,

    /// Response size; `-` in the source maps to 0
    pub bytes: u64,

    /// Response time in the log's native unit
    pub duration: u64,
}
