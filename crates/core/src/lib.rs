//! Access Log Core - Record Model, Parser and Chunked Reader
//!
//! This crate holds the storage-independent half of the access-log pipeline:
//! turning raw combined-format lines into typed records, and streaming a log
//! source in bounded batches.
//!
//! # Architecture
//!
//! - [`types`] - [`LogRecord`] and the [`ParseFailure`] a line yields instead
//! - [`parser`] - [`LogParser`], the fixed single-pass line grammar
//! - [`reader`] - [`ChunkedReader`], a finite iterator of line batches
//! - [`error`] - [`CoreError`] for configuration and input faults
//!
//! # Example
//!
//! ```rust
//! use accesslog_core::{ChunkedReader, CoreResult, LogParser};
//! use std::io::Cursor;
//!
//! fn main() -> CoreResult<()> {
//!     let input = "127.0.0.1 - - [10/Oct/2020:13:55:36 -0700] \"GET / HTTP/1.0\" 200 - \"-\" \"-\" 12\nnot a log line\n";
//!     let parser = LogParser::new()?;
//!
//!     for chunk in ChunkedReader::new(Cursor::new(input), 1024)? {
//!         for line in chunk? {
//!             match parser.parse(&line) {
//!                 Ok(record) => assert_eq!(record.bytes, 0),
//!                 Err(failure) => assert_eq!(failure.line, "not a log line"),
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Public modules
pub mod error;
pub mod parser;
pub mod reader;
pub mod types;

// Re-exports for convenience
pub use error::{CoreError, CoreResult};
pub use parser::{LogParser, TIMESTAMP_FORMAT};
pub use reader::{ChunkedReader, DEFAULT_CHUNK_SIZE};
pub use types::{LogRecord, ParseFailure, ParseFailureKind, FIELD_NAMES};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
