//! Error types for image helpers.

use thiserror::Error;

/// Errors that can occur while handling image bytes.
#[derive(Debug, Error)]
pub enum ImageToolError {
    /// The payload was empty.
    #[error("image payload is empty")]
    Empty,

    /// A `data:` URL that is not `data:<mime>;base64,<data>`.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// The base64 body could not be decoded.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The bytes are not an image format we read.
    #[error("unsupported image format")]
    UnsupportedFormat,

    /// Decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Reading a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for image helpers.
pub type Result<T> = std::result::Result<T, ImageToolError>;
