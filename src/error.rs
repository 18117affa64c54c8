//! Store-level error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the catalog and transient stores.
///
/// Nothing here is retried internally; every error is returned
/// synchronously to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but could not be parsed. Kept distinct from
    /// a missing file so a corrupted catalog is not mistaken for an empty
    /// one.
    #[error("corrupt data file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode collection: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
