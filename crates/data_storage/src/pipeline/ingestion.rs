//! Access Log Ingestion
//!
//! Loads log files into their own tables and writes one report per table.
//! A file is handled start to finish before the next one begins.

use accesslog_core::ChunkedReader;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::{
    analytics::ReportWriter,
    config::IngestConfig,
    error::{DataStorageError, DataStorageResult},
    pipeline::BatchProcessor,
    storage::{LogStore, TableName, TableStore},
    types::IngestSummary,
};

/// A file whose ingestion stopped early
#[derive(Debug)]
pub struct FileFailure {
    /// File that failed
    pub path: PathBuf,
    /// Why it stopped
    pub error: DataStorageError,
}

/// Per-file outcomes of one run, in processing order
#[derive(Debug, Default)]
pub struct IngestRun {
    /// Files that produced a report
    pub completed: Vec<IngestSummary>,
    /// Files that aborted
    pub failed: Vec<FileFailure>,
}

impl IngestRun {
    /// Check if any file aborted
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Number of files attempted
    #[must_use]
    pub fn files_attempted(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    fn record(&mut self, path: &Path, result: DataStorageResult<IngestSummary>) {
        match result {
            Ok(summary) => self.completed.push(summary),
            Err(e) => {
                error!("Ingestion of {} aborted: {}", path.display(), e);
                self.failed.push(FileFailure {
                    path: path.to_path_buf(),
                    error: e,
                });
            }
        }
    }
}

/// Reader → parser → store pipeline
#[derive(Debug)]
pub struct IngestionPipeline<S: TableStore = LogStore> {
    store: S,
    processor: BatchProcessor,
    reports: ReportWriter,
    chunk_size: usize,
    top_n: usize,
}

impl IngestionPipeline<LogStore> {
    /// Open the configured database and build a pipeline over it
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the database cannot be opened
    pub fn from_config(config: &IngestConfig) -> DataStorageResult<Self> {
        config.validate()?;
        let store = LogStore::open(&config.database_path)?.with_url_index(config.index_url);
        Self::new(
            store,
            ReportWriter::new(&config.results_dir),
            config.chunk_size,
            config.top_n,
        )
    }
}

impl<S: TableStore> IngestionPipeline<S> {
    /// Create a pipeline over `store`
    ///
    /// # Errors
    ///
    /// Returns error if `chunk_size` or `top_n` is zero
    pub fn new(
        store: S,
        reports: ReportWriter,
        chunk_size: usize,
        top_n: usize,
    ) -> DataStorageResult<Self> {
        if chunk_size == 0 {
            return Err(DataStorageError::configuration(
                "chunk_size must be greater than zero",
            ));
        }
        if top_n == 0 {
            return Err(DataStorageError::configuration(
                "top_n must be greater than zero",
            ));
        }

        Ok(Self {
            store,
            processor: BatchProcessor::new()?,
            reports,
            chunk_size,
            top_n,
        })
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consume the pipeline, returning its store
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Ingest one file into the table named after it, then report on that table
    ///
    /// Unparseable lines are logged and skipped. Any other fault aborts the
    /// file; batches committed before the fault stay in the table and no
    /// report is written.
    ///
    /// # Errors
    ///
    /// Returns error if the table name is invalid, the file cannot be read,
    /// the store fails, or the report cannot be written
    pub fn ingest_file(&mut self, path: &Path) -> DataStorageResult<IngestSummary> {
        let table = TableName::from_path(path)?;
        let chunks = ChunkedReader::open(path, self.chunk_size)?;
        self.load(path, &table, chunks)
    }

    /// Recreate `table` from `chunks`, then index, aggregate and report
    fn load<R: BufRead>(
        &mut self,
        path: &Path,
        table: &TableName,
        chunks: ChunkedReader<R>,
    ) -> DataStorageResult<IngestSummary> {
        let start = Instant::now();
        info!("Ingesting {} into table {}", path.display(), table);
        self.store.prepare_table(table)?;

        let mut lines_read = 0_u64;
        let mut records_inserted = 0_u64;
        let mut parse_failures = 0_u64;
        let mut chunk_count = 0_u64;

        for chunk in chunks {
            let lines = chunk?;
            chunk_count += 1;

            let batch = self.processor.process_chunk(&lines);
            lines_read += batch.stats.total_lines as u64;
            parse_failures += batch.stats.failure_count as u64;

            if batch.records.is_empty() {
                continue;
            }
            let written = self.store.write_batch(table, &batch.records)?;
            records_inserted += written as u64;
            debug!("Chunk {} committed: {} records", chunk_count, written);
        }

        self.store.create_indexes(table)?;
        let report = self.store.aggregate(table, self.top_n)?;
        let report_path = self.reports.write(&report, table.as_str())?;

        info!(
            "Ingested {}: {} records, {} unparseable lines in {:?}",
            path.display(),
            records_inserted,
            parse_failures,
            start.elapsed()
        );

        Ok(IngestSummary {
            source: path.to_path_buf(),
            table: table.as_str().to_string(),
            lines_read,
            records_inserted,
            parse_failures,
            chunks: chunk_count,
            report_path,
        })
    }

    /// Ingest every file directly inside `dir`, in name order
    ///
    /// A failing file is logged and recorded; the remaining files still run.
    /// Subdirectories and other non-file entries are skipped. A file whose
    /// table would resolve to one already loaded in this run (names differing
    /// only in case or hyphens) is rejected instead of replacing that table.
    ///
    /// # Errors
    ///
    /// Returns error only if the directory itself cannot be listed
    pub fn ingest_directory(&mut self, dir: &Path) -> DataStorageResult<IngestRun> {
        let list_err = |e: std::io::Error| {
            DataStorageError::input(dir, format!("Failed to list directory: {e}"))
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(list_err)? {
            let path = entry.map_err(list_err)?.path();
            if !path.is_file() {
                debug!("Skipping {}: not a regular file", path.display());
                continue;
            }
            files.push(path);
        }
        files.sort();

        info!("Found {} log files in {}", files.len(), dir.display());

        let mut run = IngestRun::default();
        let mut claimed = HashSet::new();
        for path in files {
            let result = match TableName::from_path(&path) {
                Ok(table) if !claimed.insert(table.storage_key()) => {
                    Err(DataStorageError::invalid_identifier(
                        table.as_str(),
                        "resolves to the same table as an earlier file in this run",
                    ))
                }
                _ => self.ingest_file(&path),
            };
            run.record(&path, result);
        }
        Ok(run)
    }

    /// Ingest `path`, which may be a single file or a directory of files
    ///
    /// # Errors
    ///
    /// Returns error if a directory cannot be listed; per-file faults are
    /// collected in the returned run
    pub fn ingest_path(&mut self, path: &Path) -> DataStorageResult<IngestRun> {
        if path.is_dir() {
            return self.ingest_directory(path);
        }

        let mut run = IngestRun::default();
        let result = self.ingest_file(path);
        run.record(path, result);
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockTableStore;
    use crate::types::AnalyticsReport;
    use mockall::predicate::always;
    use std::io::{BufReader, Read};
    use tempfile::TempDir;

    const VALID: &str = r#"127.0.0.1 - - [10/Oct/2020:13:55:36 -0700] "GET /index.html HTTP/1.0" 200 1024 "-" "-" 150"#;

    fn write_log(dir: &TempDir, name: &str, lines: &[&str]) -> DataStorageResult<PathBuf> {
        let path = dir.path().join(name);
        std::fs::write(&path, lines.join("\n"))?;
        Ok(path)
    }

    fn pipeline(
        store: MockTableStore,
        dir: &TempDir,
        chunk_size: usize,
    ) -> DataStorageResult<IngestionPipeline<MockTableStore>> {
        IngestionPipeline::new(store, ReportWriter::new(dir.path().join("results")), chunk_size, 3)
    }

    #[test]
    fn test_batches_follow_chunks_and_skip_bad_lines() -> DataStorageResult<()> {
        let dir = tempfile::tempdir()?;
        let path = write_log(&dir, "access-short.log", &[VALID, "garbage", VALID, VALID, "-"])?;

        let mut store = MockTableStore::new();
        store
            .expect_prepare_table()
            .withf(|table| table.as_str() == "accessshort")
            .times(1)
            .returning(|_| Ok(()));
        // chunks of 2: [VALID, garbage] [VALID, VALID] [-]
        store
            .expect_write_batch()
            .times(2)
            .returning(|_, records| Ok(records.len()));
        store.expect_create_indexes().times(1).returning(|_| Ok(()));
        store
            .expect_aggregate()
            .with(always(), mockall::predicate::eq(3))
            .times(1)
            .returning(|_, _| Ok(AnalyticsReport::default()));

        let summary = pipeline(store, &dir, 2)?.ingest_file(&path)?;
        assert_eq!(summary.table, "accessshort");
        assert_eq!(summary.lines_read, 5);
        assert_eq!(summary.records_inserted, 3);
        assert_eq!(summary.parse_failures, 2);
        assert_eq!(summary.chunks, 3);
        assert!(summary.report_path.ends_with("results/accessshort.json"));
        assert!(summary.report_path.exists());
        Ok(())
    }

    #[test]
    fn test_store_fault_aborts_without_report() -> DataStorageResult<()> {
        let dir = tempfile::tempdir()?;
        let path = write_log(&dir, "access.log", &[VALID, VALID, VALID])?;

        let mut store = MockTableStore::new();
        store.expect_prepare_table().returning(|_| Ok(()));
        store
            .expect_write_batch()
            .times(1)
            .returning(|_, _| Err(DataStorageError::database("write_batch", "disk I/O error")));
        store.expect_create_indexes().never();
        store.expect_aggregate().never();

        let result = pipeline(store, &dir, 1)?.ingest_file(&path);
        assert!(matches!(result, Err(ref e) if e.is_storage_fault()));
        assert!(!dir.path().join("results/access.json").exists());
        Ok(())
    }

    #[test]
    fn test_missing_file_is_input_fault() -> DataStorageResult<()> {
        let dir = tempfile::tempdir()?;
        let mut store = MockTableStore::new();
        store.expect_prepare_table().never();

        let result = pipeline(store, &dir, 16)?.ingest_file(&dir.path().join("absent.log"));
        assert!(matches!(result, Err(ref e) if e.is_input_fault()));
        Ok(())
    }

    #[test]
    fn test_directory_continues_past_failed_file() -> DataStorageResult<()> {
        let dir = tempfile::tempdir()?;
        let logs = dir.path().join("logs");
        std::fs::create_dir(&logs)?;
        std::fs::write(logs.join("a.log"), VALID)?;
        std::fs::write(logs.join("b.log"), VALID)?;
        std::fs::write(logs.join("c.log"), VALID)?;
        std::fs::create_dir(logs.join("nested"))?;

        let mut store = MockTableStore::new();
        store.expect_prepare_table().times(3).returning(|_| Ok(()));
        store.expect_write_batch().times(3).returning(|table, records| {
            if table.as_str() == "b" {
                Err(DataStorageError::database("write_batch", "constraint failed"))
            } else {
                Ok(records.len())
            }
        });
        store.expect_create_indexes().times(2).returning(|_| Ok(()));
        store
            .expect_aggregate()
            .times(2)
            .returning(|_, _| Ok(AnalyticsReport::default()));

        let run = pipeline(store, &dir, 16)?.ingest_path(&logs)?;
        assert_eq!(run.files_attempted(), 3);
        assert!(run.has_failures());

        let tables: Vec<&str> = run.completed.iter().map(|s| s.table.as_str()).collect();
        assert_eq!(tables, ["a", "c"]);
        assert_eq!(run.failed.len(), 1);
        assert!(run.failed[0].path.ends_with("b.log"));
        Ok(())
    }

    #[test]
    fn test_directory_rejects_colliding_table_names() -> DataStorageResult<()> {
        let dir = tempfile::tempdir()?;
        let logs = dir.path().join("logs");
        std::fs::create_dir(&logs)?;
        std::fs::write(logs.join("Access.log"), format!("{VALID}\n{VALID}"))?;
        std::fs::write(logs.join("a-b.log"), VALID)?;
        std::fs::write(logs.join("ab.log"), VALID)?;
        std::fs::write(logs.join("access.log"), VALID)?;

        let mut store = MockTableStore::new();
        store.expect_prepare_table().times(2).returning(|_| Ok(()));
        store
            .expect_write_batch()
            .times(2)
            .returning(|_, records| Ok(records.len()));
        store.expect_create_indexes().times(2).returning(|_| Ok(()));
        store
            .expect_aggregate()
            .times(2)
            .returning(|_, _| Ok(AnalyticsReport::default()));

        let run = pipeline(store, &dir, 16)?.ingest_path(&logs)?;
        assert_eq!(run.files_attempted(), 4);

        let tables: Vec<&str> = run.completed.iter().map(|s| s.table.as_str()).collect();
        assert_eq!(tables, ["Access", "ab"]);

        let rejected: Vec<PathBuf> = run.failed.iter().map(|f| f.path.clone()).collect();
        assert_eq!(rejected, vec![logs.join("ab.log"), logs.join("access.log")]);
        assert!(run
            .failed
            .iter()
            .all(|f| matches!(f.error, DataStorageError::InvalidIdentifier { .. })));
        Ok(())
    }

    /// Serves `data` once, then fails every later read
    struct BrokenSource {
        data: Option<Vec<u8>>,
    }

    impl Read for BrokenSource {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.data.take() {
                Some(data) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    Ok(n)
                }
                None => Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "device went away",
                )),
            }
        }
    }

    #[test]
    fn test_read_failure_mid_file_aborts_without_report() -> DataStorageResult<()> {
        let dir = tempfile::tempdir()?;
        let source = BrokenSource {
            data: Some(format!("{VALID}\n{VALID}\n").into_bytes()),
        };
        let chunks =
            ChunkedReader::new(BufReader::new(source), 2)?.with_source_name("broken.log");

        let mut store = MockTableStore::new();
        store.expect_prepare_table().times(1).returning(|_| Ok(()));
        store
            .expect_write_batch()
            .times(1)
            .returning(|_, records| Ok(records.len()));
        store.expect_create_indexes().never();
        store.expect_aggregate().never();

        let table = TableName::new("broken")?;
        let result = pipeline(store, &dir, 2)?.load(Path::new("broken.log"), &table, chunks);

        assert!(matches!(result, Err(ref e) if e.is_input_fault()));
        assert!(!dir.path().join("results/broken.json").exists());
        Ok(())
    }

    #[test]
    fn test_zero_top_n_rejected() -> DataStorageResult<()> {
        let dir = tempfile::tempdir()?;
        let result =
            IngestionPipeline::new(MockTableStore::new(), ReportWriter::new(dir.path()), 8, 0);
        assert!(matches!(
            result,
            Err(DataStorageError::Configuration { .. })
        ));
        Ok(())
    }
}
