//! Ingestion error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading a source export or reading/writing a canonical snapshot.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File I/O error.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content.
    #[error("failed to {operation} csv {path}")]
    Csv {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The temp file was written but could not replace the snapshot.
    #[error("failed to replace snapshot {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory that should hold source exports does not exist.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, IngestError>;
