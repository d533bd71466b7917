//! Ingestion Pipeline Module
//!
//! Reader → parser → store for one file at a time:
//!
//! ```text
//! read chunk → parse chunk → write batch → … → create indexes → aggregate → write report
//! ```

pub mod batch_processor;
pub mod ingestion;

pub use batch_processor::{BatchProcessor, BatchResult, BatchStats};
pub use ingestion::{FileFailure, IngestRun, IngestionPipeline};
