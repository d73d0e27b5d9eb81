//! Error types for image generation.

use thiserror::Error;

/// Errors that can occur while generating an image.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The generator is misconfigured (missing key, bad URL).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// The upstream API answered with an error status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The upstream answered 2xx but the body was unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The generator is temporarily unavailable.
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    /// A timeout occurred during generation.
    #[error("generation timed out")]
    Timeout,
}

impl GenerationError {
    /// Whether the upstream rejected the request itself (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, GenerationError::Api { status, .. } if (400..500).contains(status))
    }
}
