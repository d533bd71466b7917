//! `SQLite`-backed log table store

use accesslog_core::LogRecord;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info};

use super::{schema::TableQueries, table::TableName, TableStore};
use crate::{
    analytics::Aggregator,
    error::{db_err, DataStorageError, DataStorageResult},
    types::AnalyticsReport,
};

/// Owner of the database connection and every table lifecycle operation
#[derive(Debug)]
pub struct LogStore {
    /// Database connection
    conn: Connection,
    /// Also index `url` after loading
    index_url: bool,
}

impl LogStore {
    /// Open (or create) the database file at `path`
    ///
    /// # Errors
    ///
    /// Returns error if the parent directory or the database cannot be created
    pub fn open(path: &Path) -> DataStorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DataStorageError::database(
                    "create_directories",
                    format!("Failed to create directory {}: {e}", parent.display()),
                )
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            DataStorageError::database(
                "open",
                format!("Failed to open database {}: {e}", path.display()),
            )
        })?;

        let _: String = conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(db_err("pragma_wal"))?;

        info!("Log store opened at {}", path.display());
        Ok(Self {
            conn,
            index_url: false,
        })
    }

    /// Open a private in-memory database
    ///
    /// # Errors
    ///
    /// Returns error if `SQLite` cannot allocate the database
    pub fn open_in_memory() -> DataStorageResult<Self> {
        let conn = Connection::open_in_memory().map_err(db_err("open_in_memory"))?;
        Ok(Self {
            conn,
            index_url: false,
        })
    }

    /// Also build an index on `url`
    #[must_use]
    pub const fn with_url_index(mut self, enabled: bool) -> Self {
        self.index_url = enabled;
        self
    }

    /// Number of rows currently in `table`
    ///
    /// # Errors
    ///
    /// Returns error if the table does not exist or the query fails
    pub fn row_count(&self, table: &TableName) -> DataStorageResult<u64> {
        let queries = TableQueries::new(table);
        let count: i64 = self
            .conn
            .query_row(&queries.count, [], |row| row.get(0))
            .map_err(db_err("row_count"))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Names of the indexes on `table`
    ///
    /// # Errors
    ///
    /// Returns error if the catalog query fails
    pub fn index_names(&self, table: &TableName) -> DataStorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL ORDER BY name",
            )
            .map_err(db_err("index_names"))?;

        let names = stmt
            .query_map(params![table.as_str()], |row| row.get(0))
            .map_err(db_err("index_names"))?
            .collect::<Result<Vec<String>, _>>()
            .map_err(db_err("index_names"))?;
        Ok(names)
    }
}

fn to_sql_int(field: &'static str, value: u64) -> DataStorageResult<i64> {
    i64::try_from(value).map_err(|_| {
        DataStorageError::database("write_batch", format!("{field} value {value} out of range"))
    })
}

impl TableStore for LogStore {
    fn prepare_table(&mut self, table: &TableName) -> DataStorageResult<()> {
        let queries = TableQueries::new(table);
        let tx = self.conn.transaction().map_err(db_err("begin_transaction"))?;
        tx.execute(&queries.drop_table, [])
            .map_err(db_err("drop_table"))?;
        tx.execute(&queries.create_table, [])
            .map_err(db_err("create_table"))?;
        tx.commit().map_err(db_err("commit_transaction"))?;

        debug!("Table {} recreated", table);
        Ok(())
    }

    fn write_batch(
        &mut self,
        table: &TableName,
        records: &[LogRecord],
    ) -> DataStorageResult<usize> {
        let queries = TableQueries::new(table);
        let tx = self.conn.transaction().map_err(db_err("begin_transaction"))?;
        {
            let mut stmt = tx
                .prepare_cached(&queries.insert)
                .map_err(db_err("prepare_insert"))?;

            for record in records {
                stmt.execute(params![
                    record.ip,
                    record.date.to_rfc3339(),
                    record.method,
                    record.url,
                    record.status,
                    to_sql_int("bytes", record.bytes)?,
                    to_sql_int("duration", record.duration)?,
                ])
                .map_err(db_err("insert_record"))?;
            }
        }
        // Dropping an uncommitted transaction rolls it back.
        tx.commit().map_err(db_err("commit_transaction"))?;

        debug!("Batch of {} records committed to {}", records.len(), table);
        Ok(records.len())
    }

    fn create_indexes(&mut self, table: &TableName) -> DataStorageResult<()> {
        let statements = TableQueries::create_indexes(table, self.index_url);
        let tx = self.conn.transaction().map_err(db_err("begin_transaction"))?;
        for sql in &statements {
            tx.execute(sql, []).map_err(db_err("create_index"))?;
        }
        tx.commit().map_err(db_err("commit_transaction"))?;

        debug!("Created {} indexes on {}", statements.len(), table);
        Ok(())
    }

    fn aggregate(&self, table: &TableName, top_n: usize) -> DataStorageResult<AnalyticsReport> {
        Aggregator::new(top_n).aggregate(&self.conn, table)
    }
}
