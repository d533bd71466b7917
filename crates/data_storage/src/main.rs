//! `access-logs` - ingest a log file or directory and write per-table reports
//!
//! Configuration comes from the TOML file named by `ACCESS_LOGS_CONFIG`
//! (default `config/access_logs.toml`), overridden by `ACCESS_LOGS__*`
//! environment variables.

use accesslog_data_storage::{init_logging, IngestConfig, IngestionPipeline};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Environment variable naming the configuration file
const CONFIG_PATH_VAR: &str = "ACCESS_LOGS_CONFIG";

/// Configuration file used when `ACCESS_LOGS_CONFIG` is unset
const DEFAULT_CONFIG_PATH: &str = "config/access_logs.toml";

fn main() -> Result<()> {
    let config_path = std::env::var_os(CONFIG_PATH_VAR)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    let config = IngestConfig::load(Some(config_path.as_path()))
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    init_logging(&config.logging);

    let mut pipeline = IngestionPipeline::from_config(&config)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    let run = pipeline
        .ingest_path(&config.input_path)
        .with_context(|| format!("Failed to ingest {}", config.input_path.display()))?;

    for summary in &run.completed {
        info!(
            "{}: {} records, {} skipped -> {}",
            summary.table,
            summary.records_inserted,
            summary.parse_failures,
            summary.report_path.display()
        );
    }

    if run.has_failures() {
        bail!(
            "{} of {} files failed to ingest",
            run.failed.len(),
            run.files_attempted()
        );
    }
    Ok(())
}
