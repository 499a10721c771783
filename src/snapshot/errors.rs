//! Snapshot error types

use std::io;
use std::path::Path;

use thiserror::Error;

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug, Clone, Error)]
pub enum SnapshotError {
    #[error("No snapshot at {0}")]
    Missing(String),

    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Checksum mismatch: manifest says {expected}, state file is {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Unsupported snapshot format version {0}")]
    UnsupportedFormat(u8),

    #[error("Invalid snapshot archive: {0}")]
    InvalidArchive(String),

    #[error("A snapshot already exists at {0}")]
    Occupied(String),
}

impl SnapshotError {
    pub fn io(path: &Path, err: io::Error) -> Self {
        SnapshotError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SnapshotError::Missing(_) => "BOOK_SNAPSHOT_MISSING",
            SnapshotError::Io { .. } => "BOOK_SNAPSHOT_IO",
            SnapshotError::Serialization(_) => "BOOK_SNAPSHOT_SERIALIZATION",
            SnapshotError::ChecksumMismatch { .. } => "BOOK_SNAPSHOT_CHECKSUM",
            SnapshotError::UnsupportedFormat(_) => "BOOK_SNAPSHOT_FORMAT",
            SnapshotError::InvalidArchive(_) => "BOOK_SNAPSHOT_ARCHIVE",
            SnapshotError::Occupied(_) => "BOOK_SNAPSHOT_OCCUPIED",
        }
    }

    /// Corruption, as opposed to an environment problem
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            SnapshotError::ChecksumMismatch { .. }
                | SnapshotError::Serialization(_)
                | SnapshotError::InvalidArchive(_)
        )
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        SnapshotError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_path() {
        let err = SnapshotError::io(
            Path::new("/ledger/state-1.json"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/ledger/state-1.json"));
        assert_eq!(err.code(), "BOOK_SNAPSHOT_IO");
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_checksum_mismatch_is_corruption() {
        let err = SnapshotError::ChecksumMismatch {
            expected: "crc32:00000001".into(),
            actual: "crc32:00000002".into(),
        };
        assert!(err.is_corruption());
    }
}
