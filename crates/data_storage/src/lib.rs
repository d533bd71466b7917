//! Access Log Data Storage - Ingestion, `SQLite` Tables and Reports
//!
//! Loads combined-format access logs into one `SQLite` table per file and
//! writes a JSON analytics report for every table loaded.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ChunkedReader │ → │BatchProcessor│ → │  TableStore  │ → │ ReportWriter │
//! │  (core)      │   │  (parse)     │   │  (SQLite)    │   │  (JSON)      │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! A file's table is dropped and recreated, filled one committed batch per
//! chunk, indexed once loading finishes, then aggregated. Unparseable lines
//! are logged and skipped. Any other fault aborts that file only.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use accesslog_data_storage::{init_logging, IngestConfig, IngestionPipeline};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IngestConfig::load(None)?;
//!     init_logging(&config.logging);
//!
//!     let mut pipeline = IngestionPipeline::from_config(&config)?;
//!     let run = pipeline.ingest_path(&config.input_path)?;
//!     for summary in &run.completed {
//!         println!("{} -> {}", summary.table, summary.report_path.display());
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
#![allow(clippy::cast_possible_truncation)] // Row counts never approach u32/usize limits
#![allow(clippy::module_name_repetitions)] // Type names read better unqualified at call sites

// Internal modules
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Storage modules
pub mod storage;

// Pipeline processing
pub mod pipeline;

// Aggregation and reporting
pub mod analytics;

// Re-exports for convenience
pub use analytics::{Aggregator, ReportWriter, DEFAULT_TOP_N};
pub use config::{IngestConfig, LoggingConfig, ENV_PREFIX};
pub use error::{DataStorageError, DataStorageResult};
pub use logging::init_logging;
pub use pipeline::{
    BatchProcessor, BatchResult, BatchStats, FileFailure, IngestRun, IngestionPipeline,
};
pub use storage::{LogStore, TableName, TableStore};
pub use types::{AnalyticsReport, IngestSummary, LongestRequest, RankedCounts};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
