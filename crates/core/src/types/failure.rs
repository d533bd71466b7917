//! Typed parse failure for a single log line

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which part of the line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailureKind {
    /// Line does not have the combined-log shape
    Grammar,
    /// Request line has fewer than two tokens
    RequestLine,
    /// Bracketed timestamp is malformed
    Timestamp,
    /// Status is not a base-10 integer in range
    Status,
    /// Bytes is neither `-` nor a base-10 integer in range
    Bytes,
    /// Duration is not a base-10 integer in range
    Duration,
}

impl ParseFailureKind {
    /// Short name used in diagnostics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grammar => "grammar",
            Self::RequestLine => "request_line",
            Self::Timestamp => "timestamp",
            Self::Status => "status",
            Self::Bytes => "bytes",
            Self::Duration => "duration",
        }
    }
}

impl fmt::Display for ParseFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line that could not be turned into a [`LogRecord`](super::LogRecord)
///
/// Carries the raw line verbatim so the operator can see exactly what was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("unrecognized log line ({kind}): {line}")]
pub struct ParseFailure {
    /// The original line, without its terminator
    pub line: String,
    /// What made the line unparseable
    pub kind: ParseFailureKind,
}

impl ParseFailure {
    /// Create a failure for `line`
    pub fn new(line: impl Into<String>, kind: ParseFailureKind) -> Self {
        Self {
            line: line.into(),
            kind,
        }
    }
}
