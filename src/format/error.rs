//! Error types for export and session import.

use thiserror::Error;

/// Errors that can occur while exporting or importing annotations.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error while writing or reading a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input is not valid for this format
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// Session file written by an incompatible version
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build reads
        expected: String,
        /// Version found in the file
        found: String,
    },

    /// Format id not present in the registry
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// Operation not supported by this format
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}
