//! Chunk Processing
//!
//! Parses one chunk of raw lines into an insertable batch. Every line is
//! handled independently: a bad line is reported and dropped, and the rest
//! of the chunk carries on.

use accesslog_core::{LogParser, LogRecord, ParseFailure};
use std::time::Instant;

use crate::error::DataStorageResult;

/// Statistics for one parsed chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Lines in the chunk
    pub total_lines: usize,
    /// Lines turned into records
    pub success_count: usize,
    /// Lines rejected by the parser
    pub failure_count: usize,
    /// Parsing time in microseconds
    pub processing_time_us: u64,
}

/// Parsed chunk, ready to be written as one batch
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Records that parsed, in source order
    pub records: Vec<LogRecord>,
    /// Lines that did not parse, in source order
    pub failures: Vec<ParseFailure>,
    /// Processing statistics
    pub stats: BatchStats,
}

/// Turns raw line chunks into record batches
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    parser: LogParser,
}

impl BatchProcessor {
    /// Create a new batch processor
    ///
    /// # Errors
    ///
    /// Returns error if the line parser cannot be built
    pub fn new() -> DataStorageResult<Self> {
        Ok(Self {
            parser: LogParser::new()?,
        })
    }

    /// Parse every line of `lines`
    ///
    /// Each failure is logged as it is found, with the offending line.
    #[must_use]
    pub fn process_chunk(&self, lines: &[String]) -> BatchResult {
        let start = Instant::now();
        let mut records = Vec::with_capacity(lines.len());
        let mut failures = Vec::new();

        for line in lines {
            match self.parser.parse(line) {
                Ok(record) => records.push(record),
                Err(failure) => {
                    tracing::warn!(kind = %failure.kind, "Unrecognized log line: {}", failure.line);
                    failures.push(failure);
                }
            }
        }

        let stats = BatchStats {
            total_lines: lines.len(),
            success_count: records.len(),
            failure_count: failures.len(),
            processing_time_us: u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
        };

        tracing::debug!(
            "Chunk parsed: {} records, {} failures in {}us",
            stats.success_count,
            stats.failure_count,
            stats.processing_time_us
        );

        BatchResult {
            records,
            failures,
            stats,
        }
    }
}
