//! Storage for ingested log tables
//!
//! One `SQLite` table per input file. The pipeline only reaches storage
//! through [`TableStore`], so the table lifecycle stays in one place.

use accesslog_core::LogRecord;

use crate::{error::DataStorageResult, types::AnalyticsReport};

pub mod schema;
pub mod sqlite_store;
pub mod table;

pub use schema::{TableQueries, INDEXED_COLUMNS, URL_INDEX_COLUMN};
pub use sqlite_store::LogStore;
pub use table::{TableName, IDENTIFIER_PATTERN, RESERVED_PREFIX};

/// Table lifecycle used by the ingestion pipeline
///
/// Assumes a single writer per table for the lifetime of a run.
#[cfg_attr(test, mockall::automock)]
pub trait TableStore {
    /// Drop `table` if it exists and create it empty
    ///
    /// # Errors
    ///
    /// Returns error if the store rejects the schema change
    fn prepare_table(&mut self, table: &TableName) -> DataStorageResult<()>;

    /// Insert `records` into `table` in one transaction
    ///
    /// Either every record is committed or none is.
    ///
    /// # Errors
    ///
    /// Returns error if any insert or the commit fails
    fn write_batch(&mut self, table: &TableName, records: &[LogRecord]) -> DataStorageResult<usize>;

    /// Build the lookup indexes for `table`, once loading is complete
    ///
    /// # Errors
    ///
    /// Returns error if an index cannot be created
    fn create_indexes(&mut self, table: &TableName) -> DataStorageResult<()>;

    /// Run the fixed analytics queries against `table`
    ///
    /// # Errors
    ///
    /// Returns error if a query fails
    fn aggregate(&self, table: &TableName, top_n: usize) -> DataStorageResult<AnalyticsReport>;
}
