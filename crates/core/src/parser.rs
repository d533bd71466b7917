//! Combined Log Format Parser
//!
//! Turns one raw access-log line into a [`LogRecord`] or a [`ParseFailure`].
//!
//! Expected shape:
//!
//! ```text
//! <ip> <ident> <ident> [<timestamp>] "<request-line>" <status> <bytes|-> "<referer>" "<user-agent>" <duration>
//! ```
//!
//! The whole line must match; anything trailing or missing is a failure.

use chrono::DateTime;
use regex::Regex;

use crate::{
    error::{CoreError, CoreResult},
    types::{LogRecord, ParseFailure, ParseFailureKind},
};

/// Line grammar; numeric slots are captured loosely and checked afterwards
/// so failures can name the offending field.
const LINE_PATTERN: &str = r#"^([0-9.]+)\s(\S+)\s(\S+)\s+\[([^\]]+)\]\s"([^"]*)"\s(\S+)\s(\S+)\s"([^"]*)"\s"([^"]*)"\s(\S+)$"#;

/// Timestamp layout inside the brackets, e.g. `10/Oct/2020:13:55:36 -0700`
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

const GROUP_IP: usize = 1;
const GROUP_TIMESTAMP: usize = 4;
const GROUP_REQUEST: usize = 5;
const GROUP_STATUS: usize = 6;
const GROUP_BYTES: usize = 7;
const GROUP_DURATION: usize = 10;

/// Parser for combined-format access-log lines
///
/// Compiles the grammar once; `parse` can then be called for every line of a run.
#[derive(Debug, Clone)]
pub struct LogParser {
    pattern: Regex,
}

impl LogParser {
    /// Create a new parser
    ///
    /// # Errors
    ///
    /// Returns error if the line grammar fails to compile
    pub fn new() -> CoreResult<Self> {
        let pattern = Regex::new(LINE_PATTERN)
            .map_err(|e| CoreError::configuration(format!("Invalid line grammar: {e}")))?;
        Ok(Self { pattern })
    }

    /// Parse one line
    ///
    /// Never panics: every rejection is returned as a [`ParseFailure`] that
    /// carries `line` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure`] if the line does not match the grammar or one
    /// of its typed fields is malformed
    pub fn parse(&self, line: &str) -> Result<LogRecord, ParseFailure> {
        let fail = |kind| ParseFailure::new(line, kind);

        let caps = self
            .pattern
            .captures(line.trim_end())
            .ok_or_else(|| fail(ParseFailureKind::Grammar))?;
        let group = |idx: usize| caps.get(idx).map_or("", |m| m.as_str());

        let date = DateTime::parse_from_str(group(GROUP_TIMESTAMP), TIMESTAMP_FORMAT)
            .map_err(|_| fail(ParseFailureKind::Timestamp))?;

        let mut request = group(GROUP_REQUEST).split_whitespace();
        let (Some(method), Some(url)) = (request.next(), request.next()) else {
            return Err(fail(ParseFailureKind::RequestLine));
        };

        let status = parse_decimal(group(GROUP_STATUS))
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| fail(ParseFailureKind::Status))?;

        let bytes = match group(GROUP_BYTES) {
            "-" => 0,
            raw => parse_decimal(raw).ok_or_else(|| fail(ParseFailureKind::Bytes))?,
        };

        let duration =
            parse_decimal(group(GROUP_DURATION)).ok_or_else(|| fail(ParseFailureKind::Duration))?;

        Ok(LogRecord {
            ip: group(GROUP_IP).to_string(),
            date,
            method: method.to_string(),
            url: url.to_string(),
            status,
            bytes,
            duration,
        })
    }
}

/// Base-10 digits only, no sign, small enough for a signed 64-bit column
fn parse_decimal(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u64>()
        .ok()
        .filter(|v| i64::try_from(*v).is_ok())
}
