//! Error taxonomy for the progress model and its boundaries.
//!
//! No error here is fatal: validation failures are surfaced to the caller
//! as form-level messages, persistence failures are logged and swallowed,
//! and export failures become a user-visible failure notice.

use std::path::PathBuf;
use thiserror::Error;

/// Rejected add-timer input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("timer name must not be empty")]
    EmptyTimerName,

    #[error("category name must not be empty")]
    EmptyCategoryName,

    #[error("duration must be a positive number of seconds")]
    NonPositiveDuration,

    #[error("timer '{name}' already exists in category '{category}'")]
    DuplicateTimer { category: String, name: String },
}

/// Storage read/write failure. Callers log these and keep going; the next
/// save attempt retries naturally.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to access storage at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored progress is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored timestamp '{0}' is not a valid RFC 3339 datetime")]
    Timestamp(String),
}

/// Export file write failure.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write export file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize export document: {0}")]
    Json(#[from] serde_json::Error),
}
