//! SQL text for one log table
//!
//! Built once per table from a validated [`TableName`]; values are always
//! bound as parameters, only the identifier is interpolated.

use accesslog_core::FIELD_NAMES;

use super::table::TableName;

/// Columns that get an index after bulk load
pub const INDEXED_COLUMNS: [&str; 3] = ["ip", "method", "status"];

/// Extra index kept by the earlier schema variant
pub const URL_INDEX_COLUMN: &str = "url";

/// Immutable query set for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQueries {
    /// Drop the table if present
    pub drop_table: String,
    /// Create the table
    pub create_table: String,
    /// Insert one record, seven bound parameters in [`FIELD_NAMES`] order
    pub insert: String,
    /// Total row count
    pub count: String,
    /// Per-method counts, highest first, ties by first appearance
    pub method_counts: String,
    /// Per-ip counts, highest first, ties by first appearance; `?1` is the limit
    pub top_ips: String,
    /// Slowest rows, ties by insertion order; `?1` is the limit
    pub top_longest: String,
}

impl TableQueries {
    /// Build the query set for `table`
    #[must_use]
    pub fn new(table: &TableName) -> Self {
        let t = table.quoted();
        let placeholders = (1..=FIELD_NAMES.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            drop_table: format!("DROP TABLE IF EXISTS {t}"),
            create_table: format!(
                r"CREATE TABLE {t} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    ip TEXT NOT NULL,
                    date TEXT NOT NULL,
                    method TEXT NOT NULL,
                    url TEXT NOT NULL,
                    status INTEGER NOT NULL,
                    bytes INTEGER NOT NULL,
                    duration INTEGER NOT NULL
                )"
            ),
            insert: format!(
                "INSERT INTO {t} ({}) VALUES ({placeholders})",
                FIELD_NAMES.join(", ")
            ),
            count: format!("SELECT COUNT(*) FROM {t}"),
            method_counts: format!(
                "SELECT method, COUNT(*) AS hits FROM {t} GROUP BY method ORDER BY hits DESC, MIN(id) ASC"
            ),
            top_ips: format!(
                "SELECT ip, COUNT(*) AS hits FROM {t} GROUP BY ip ORDER BY hits DESC, MIN(id) ASC LIMIT ?1"
            ),
            top_longest: format!(
                "SELECT ip, date, method, url, duration FROM {t} ORDER BY duration DESC, id ASC LIMIT ?1"
            ),
        }
    }

    /// Index statements for `table`, one per column
    #[must_use]
    pub fn create_indexes(table: &TableName, include_url: bool) -> Vec<String> {
        let t = table.quoted();
        INDEXED_COLUMNS
            .iter()
            .copied()
            .chain(include_url.then_some(URL_INDEX_COLUMN))
            .map(|column| {
                format!(
                    "CREATE INDEX IF NOT EXISTS \"idx_{}_{column}\" ON {t} ({column})",
                    table.as_str()
                )
            })
            .collect()
    }
}
