//! Analytics over ingested tables
//!
//! Aggregation of a fully loaded table into an [`AnalyticsReport`](crate::types::AnalyticsReport)
//! and persistence of that report as a JSON document.

pub mod aggregator;
pub mod report_writer;

pub use aggregator::{Aggregator, DEFAULT_TOP_N};
pub use report_writer::ReportWriter;
