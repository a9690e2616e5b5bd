//! Error types for history persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or saving ranking history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Reading or writing the history file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The history file exists but is not a valid history document.
    #[error("History file {path} is corrupt: {source}")]
    Corrupt {
        /// File that failed to parse
        path: PathBuf,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the store failed.
    #[error("Failed to serialize history: {0}")]
    Json(#[from] serde_json::Error),

    /// The advisory lock on the history file could not be taken.
    #[error("Failed to lock {path}: {source}")]
    Lock {
        /// Lock file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Replacing the history file with the freshly written copy failed.
    #[error("Failed to persist history: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// A specialized Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
