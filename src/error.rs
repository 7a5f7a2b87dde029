//! Error types for board operations and persistence.

use thiserror::Error;

/// Errors raised while reading or writing the key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize board: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors returned by board mutations.
#[derive(Debug, Error)]
pub enum BoardError {
    /// The task name was empty after trimming.
    #[error("task name must not be empty")]
    EmptyName,

    /// The deadline text could not be read as a date or date-time.
    #[error("unrecognised deadline '{0}', expected YYYY-MM-DDTHH:MM")]
    InvalidDeadline(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
