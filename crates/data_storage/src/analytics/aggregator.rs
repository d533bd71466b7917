//! Table Aggregator
//!
//! Fixed read-only queries summarising one log table. Ranking ties are broken
//! by insertion order so repeated runs over the same file produce the same
//! report.

use chrono::DateTime;
use rusqlite::{params, Connection, Params};

use crate::{
    error::{db_err, DataStorageError, DataStorageResult},
    storage::{TableName, TableQueries},
    types::{AnalyticsReport, LongestRequest, RankedCounts},
};

/// Default size of the top-IP and longest-request rankings
pub const DEFAULT_TOP_N: usize = 3;

/// Builds an [`AnalyticsReport`] from a populated table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregator {
    top_n: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

impl Aggregator {
    /// Create an aggregator keeping `top_n` entries per ranking
    #[must_use]
    pub const fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Run every query against `table`
    ///
    /// An empty table yields an empty report, not an error.
    ///
    /// # Errors
    ///
    /// Returns error if a query fails or a stored row cannot be decoded
    pub fn aggregate(
        &self,
        conn: &Connection,
        table: &TableName,
    ) -> DataStorageResult<AnalyticsReport> {
        let queries = TableQueries::new(table);
        let limit = i64::try_from(self.top_n).unwrap_or(i64::MAX);

        let total: i64 = conn
            .query_row(&queries.count, [], |row| row.get(0))
            .map_err(db_err("count_requests"))?;

        let report = AnalyticsReport {
            total_requests: u64::try_from(total).unwrap_or(0),
            total_stat: Self::ranked(conn, &queries.method_counts, params![], "count_methods")?,
            top_ips: Self::ranked(conn, &queries.top_ips, params![limit], "top_ips")?,
            top_longest: Self::longest(conn, &queries.top_longest, limit)?,
        };

        tracing::debug!(
            "Aggregated {}: {} requests, {} methods",
            table,
            report.total_requests,
            report.total_stat.len()
        );
        Ok(report)
    }

    fn ranked<P: Params>(
        conn: &Connection,
        sql: &str,
        params: P,
        operation: &'static str,
    ) -> DataStorageResult<RankedCounts> {
        let mut stmt = conn.prepare(sql).map_err(db_err(operation))?;
        let rows = stmt
            .query_map(params, |row| {
                let key: String = row.get(0)?;
                let hits: i64 = row.get(1)?;
                Ok((key, u64::try_from(hits).unwrap_or(0)))
            })
            .map_err(db_err(operation))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err(operation))?;
        Ok(RankedCounts::new(rows))
    }

    fn longest(conn: &Connection, sql: &str, limit: i64) -> DataStorageResult<Vec<LongestRequest>> {
        let mut stmt = conn.prepare(sql).map_err(db_err("top_longest"))?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(db_err("top_longest"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("top_longest"))?;

        rows.into_iter()
            .map(|(ip, date, method, url, duration)| {
                let date = DateTime::parse_from_rfc3339(&date).map_err(|e| {
                    DataStorageError::database(
                        "top_longest",
                        format!("Stored date '{date}' unreadable: {e}"),
                    )
                })?;
                Ok(LongestRequest {
                    ip,
                    date,
                    method,
                    url,
                    duration: u64::try_from(duration).unwrap_or(0),
                })
            })
            .collect()
    }
}
