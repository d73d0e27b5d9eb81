//! Storage error types.

use thiserror::Error;

/// Errors that can occur while storing objects.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Bucket or key would escape the store or is malformed.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// Missing or invalid settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// The storage API answered with an error status.
    #[error("storage API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
