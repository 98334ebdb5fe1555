//! Store error types
//!
//! Every failure to reach, read or commit the tables is surfaced to the
//! caller. The store never retries.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::RecordKind;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transaction could not begin, write or commit
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Disk I/O failure on the durable image
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Durable image failed checksum or format verification
    #[error("Store image corrupted: {0}")]
    Corrupted(String),

    /// Tables could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Referenced row does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: u64 },
}

impl StoreError {
    pub fn io_at(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn not_found(kind: RecordKind, id: u64) -> Self {
        StoreError::NotFound { kind, id }
    }

    /// Lock poisoning means a writer panicked mid-transaction
    pub(crate) fn poisoned() -> Self {
        StoreError::Unavailable("table lock poisoned".to_string())
    }

    /// True for failures of the store itself rather than of the request
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, StoreError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::not_found(RecordKind::Family, 12);
        assert_eq!(err.to_string(), "Family 12 not found");
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = StoreError::io_at(
            Path::new("/data/tables.json"),
            io::Error::new(io::ErrorKind::Other, "disk gone"),
        );
        let display = err.to_string();
        assert!(display.contains("/data/tables.json"));
        assert!(display.contains("disk gone"));
        assert!(err.is_unavailable());
    }
}
