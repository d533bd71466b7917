//! Access Log Core Error System
//!
//! Errors raised while reading or configuring the record pipeline.
//! Line-level parse problems are not errors here: they surface as
//! [`ParseFailure`](crate::types::ParseFailure) values instead.

use thiserror::Error;

/// Core result type for all operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Main error type for core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Source could not be opened or read
    #[error("Input error: {source_name} - {source}")]
    Input {
        /// Path or description of the input
        source_name: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create input error for a named source
    pub fn input(source_name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Input {
            source_name: source_name.into(),
            source,
        }
    }

    /// Check if error came from reading the input
    #[must_use]
    pub const fn is_input_fault(&self) -> bool {
        matches!(self, Self::Input { .. } | Self::Io(_))
    }
}
