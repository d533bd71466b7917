//! Access Log Core Types
//!
//! The parsed record and the typed failure a line can produce instead.

pub mod failure;
pub mod record;

// Re-exports for convenience
pub use failure::{ParseFailure, ParseFailureKind};
pub use record::{LogRecord, FIELD_NAMES};
