//! Access Log Ingestion Configuration
//!
//! Layered configuration: built-in defaults, then an optional TOML file, then
//! `ACCESS_LOGS__*` environment variables (e.g. `ACCESS_LOGS__CHUNK_SIZE=512`,
//! `ACCESS_LOGS__LOGGING__LEVEL=debug`).

use accesslog_core::DEFAULT_CHUNK_SIZE;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DataStorageError, DataStorageResult};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "ACCESS_LOGS";

/// Main configuration for an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// `SQLite` database file holding one table per ingested log
    pub database_path: PathBuf,

    /// Log file or directory of log files to ingest
    pub input_path: PathBuf,

    /// Directory receiving one JSON report per table
    pub results_dir: PathBuf,

    /// Lines per chunk (and records per write transaction)
    pub chunk_size: usize,

    /// Entries kept in the top-IP and longest-request rankings
    pub top_n: usize,

    /// Also index the `url` column
    pub index_url: bool,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("sqlite-db/db_logs.db"),
            input_path: PathBuf::from("logs"),
            results_dir: PathBuf::from("results"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            top_n: 3,
            index_url: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl IngestConfig {
    /// Load configuration from defaults, an optional TOML file and the environment
    ///
    /// A missing file is not an error; a malformed one is.
    ///
    /// # Errors
    ///
    /// Returns error if a source cannot be parsed or the result fails validation
    pub fn load(path: Option<&Path>) -> DataStorageResult<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text layered over the defaults
    ///
    /// # Errors
    ///
    /// Returns error if the text is malformed or the result fails validation
    pub fn from_toml_str(contents: &str) -> DataStorageResult<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if a value is out of range
    pub fn validate(&self) -> DataStorageResult<()> {
        if self.chunk_size == 0 {
            return Err(DataStorageError::configuration(
                "chunk_size must be greater than zero",
            ));
        }
        if self.top_n == 0 {
            return Err(DataStorageError::configuration(
                "top_n must be greater than zero",
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(DataStorageError::configuration(
                "logging.level must not be empty",
            ));
        }
        Ok(())
    }
}
