//! Report Writer
//!
//! Writes one JSON document per table into the results directory. The
//! document is staged in a temporary file next to its destination and then
//! renamed over it, so readers see either the old report or the new one.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{
    error::{DataStorageError, DataStorageResult},
    types::AnalyticsReport,
};

/// Persists analytics reports under a results directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    results_dir: PathBuf,
}

impl ReportWriter {
    /// Create a writer for `results_dir`; the directory is created on first write
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// Results directory
    #[must_use]
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Destination for the report called `name`
    #[must_use]
    pub fn destination(&self, name: &str) -> PathBuf {
        self.results_dir.join(format!("{name}.json"))
    }

    /// Serialize `report` to `<results_dir>/<name>.json`, replacing any earlier file
    ///
    /// # Errors
    ///
    /// Returns error if the directory, temporary file or final rename fails
    pub fn write(&self, report: &AnalyticsReport, name: &str) -> DataStorageResult<PathBuf> {
        let destination = self.destination(name);
        let report_err = |reason: String| DataStorageError::report(&destination, reason);

        std::fs::create_dir_all(&self.results_dir)
            .map_err(|e| report_err(format!("Failed to create results directory: {e}")))?;

        let staged = NamedTempFile::new_in(&self.results_dir)
            .map_err(|e| report_err(format!("Failed to stage report: {e}")))?;

        {
            let mut writer = BufWriter::new(staged.as_file());
            serde_json::to_writer_pretty(&mut writer, report)?;
            writer
                .write_all(b"\n")
                .and_then(|()| writer.flush())
                .map_err(|e| report_err(format!("Failed to write report: {e}")))?;
        }

        staged
            .persist(&destination)
            .map_err(|e| report_err(format!("Failed to replace report: {}", e.error)))?;

        tracing::info!("Report written to {}", destination.display());
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LongestRequest, RankedCounts};
    use chrono::DateTime;

    fn sample_report() -> DataStorageResult<AnalyticsReport> {
        let date = DateTime::parse_from_rfc3339("2020-10-10T13:55:36-07:00")
            .map_err(|e| DataStorageError::configuration(e.to_string()))?;
        Ok(AnalyticsReport {
            total_requests: 1,
            total_stat: RankedCounts::new(vec![("GET".to_string(), 1)]),
            top_ips: RankedCounts::new(vec![("127.0.0.1".to_string(), 1)]),
            top_longest: vec![LongestRequest {
                ip: "127.0.0.1".to_string(),
                date,
                method: "GET".to_string(),
                url: "/index.html".to_string(),
                duration: 150,
            }],
        })
    }

    #[test]
    fn test_write_creates_directory_and_document() -> DataStorageResult<()> {
        let dir = tempfile::tempdir()?;
        let writer = ReportWriter::new(dir.path().join("results"));

        let path = writer.write(&sample_report()?, "accessshort")?;
        assert_eq!(path, dir.path().join("results/accessshort.json"));

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(value["total_requests"], 1);
        assert_eq!(value["total_stat"]["GET"], 1);
        assert_eq!(value["top_ips"]["127.0.0.1"], 1);
        assert_eq!(value["top_longest"][0]["date"], "2020-10-10T13:55:36-07:00");
        assert_eq!(value["top_longest"][0]["duration"], 150);
        Ok(())
    }

    #[test]
    fn test_write_replaces_previous_report() -> DataStorageResult<()> {
        let dir = tempfile::tempdir()?;
        let writer = ReportWriter::new(dir.path());
        let destination = writer.destination("access");
        std::fs::write(&destination, "x".repeat(10_000))?;

        writer.write(&AnalyticsReport::default(), "access")?;

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&destination)?)?;
        assert_eq!(value["total_requests"], 0);

        // no staging files left behind
        let entries = std::fs::read_dir(dir.path())?.count();
        assert_eq!(entries, 1);
        Ok(())
    }

    #[test]
    fn test_keys_in_construction_order() -> DataStorageResult<()> {
        let dir = tempfile::tempdir()?;
        let writer = ReportWriter::new(dir.path());
        let path = writer.write(&sample_report()?, "ordered")?;
        let text = std::fs::read_to_string(path)?;

        let positions: Vec<usize> = ["total_requests", "total_stat", "top_ips", "top_longest"]
            .iter()
            .filter_map(|key| text.find(&format!("\"{key}\"")))
            .collect();
        assert_eq!(positions.len(), 4);
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        Ok(())
    }
}
