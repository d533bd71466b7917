//! Access Log Data Storage Error System
//!
//! File-level faults for ingestion. Parse failures are not represented here:
//! they are reported and skipped by the pipeline, never propagated.

use accesslog_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Data storage result type for all operations
pub type DataStorageResult<T> = Result<T, DataStorageError>;

/// Main error type for data storage operations
#[derive(Error, Debug)]
pub enum DataStorageError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Input file could not be opened or read
    #[error("Input failed: {} - {reason}", path.display())]
    Input {
        /// File being ingested
        path: PathBuf,
        /// Reason for failure
        reason: String,
    },

    /// Database operation errors
    #[error("Database operation failed: {operation} - {reason}")]
    Database {
        /// Operation that failed
        operation: String,
        /// Reason for failure
        reason: String,
    },

    /// Table identifier rejected before reaching SQL
    #[error("Invalid table name '{name}': {reason}")]
    InvalidIdentifier {
        /// Candidate identifier
        name: String,
        /// Reason for rejection
        reason: String,
    },

    /// Report could not be written
    #[error("Report write failed: {} - {reason}", path.display())]
    Report {
        /// Destination of the report
        path: PathBuf,
        /// Reason for failure
        reason: String,
    },

    /// Errors from the record layer
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration source errors
    #[error("Configuration source error: {0}")]
    Config(#[from] config::ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataStorageError {
    /// Create configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create input error
    pub fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create database error
    pub fn database(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Database {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create invalid identifier error
    pub fn invalid_identifier(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create report error
    pub fn report(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Report {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if the store rejected a write, index build or query
    #[must_use]
    pub const fn is_storage_fault(&self) -> bool {
        matches!(self, Self::Database { .. })
    }

    /// Check if the source file could not be opened or read
    #[must_use]
    pub const fn is_input_fault(&self) -> bool {
        match self {
            Self::Input { .. } => true,
            Self::Core(core) => core.is_input_fault(),
            _ => false,
        }
    }
}

/// Map a `rusqlite` failure to a database error for `operation`
pub(crate) fn db_err(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> DataStorageError {
    move |e| DataStorageError::database(operation, e.to_string())
}
