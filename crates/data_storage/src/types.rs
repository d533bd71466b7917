//! Access Log Data Storage Types
//!
//! Report and summary types produced by ingestion and aggregation.

use chrono::{DateTime, FixedOffset};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;

/// Counts keyed by a column value, kept in ranking order
///
/// Serializes as a JSON object whose keys appear in ranking order, so the
/// report document reads highest count first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedCounts(Vec<(String, u64)>);

impl RankedCounts {
    /// Create from already-ranked entries
    #[must_use]
    pub const fn new(entries: Vec<(String, u64)>) -> Self {
        Self(entries)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Count for `key`, if ranked
    #[must_use]
    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    /// Entries in ranking order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Ranked keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for RankedCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, count) in &self.0 {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

/// One of the slowest requests in a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongestRequest {
    /// Client address
    pub ip: String,
    /// Request time with its logged offset
    pub date: DateTime<FixedOffset>,
    /// Request method
    pub method: String,
    /// Request target
    pub url: String,
    /// Response time
    pub duration: u64,
}

/// Aggregated view over one ingested table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsReport {
    /// Total number of stored requests
    pub total_requests: u64,
    /// Request count per method, highest first
    pub total_stat: RankedCounts,
    /// Most frequent client addresses, highest first
    pub top_ips: RankedCounts,
    /// Slowest requests, slowest first
    pub top_longest: Vec<LongestRequest>,
}

/// Outcome of ingesting one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Source file
    pub source: PathBuf,
    /// Table the records were loaded into
    pub table: String,
    /// Lines read from the source
    pub lines_read: u64,
    /// Records committed to the table
    pub records_inserted: u64,
    /// Lines skipped as unparseable
    pub parse_failures: u64,
    /// Chunks consumed
    pub chunks: u64,
    /// Where the report was written
    pub report_path: PathBuf,
}
