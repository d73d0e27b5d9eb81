//! Echo imager - returns the source image.

use studio_core::{async_trait, EditRequest, EditedImage, GenerationError, ImageGenerator};

/// A generator that hands the source image back.
///
/// Useful for exercising the whole request flow without an image API.
#[derive(Debug, Clone, Default)]
pub struct EchoImager {
    /// Fixed output instead of the source image.
    output: Option<Vec<u8>>,
}

impl EchoImager {
    /// Create an EchoImager that returns the source bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an EchoImager that always returns `bytes`.
    pub fn with_output(bytes: Vec<u8>) -> Self {
        Self {
            output: Some(bytes),
        }
    }
}

#[async_trait]
impl ImageGenerator for EchoImager {
    async fn edit(&self, request: EditRequest) -> Result<EditedImage, GenerationError> {
        let bytes = match &self.output {
            Some(bytes) => bytes.clone(),
            None => request.image,
        };

        Ok(EditedImage {
            bytes,
            mime_type: request.mime_type,
            revised_prompt: None,
        })
    }

    fn name(&self) -> &str {
        "EchoImager"
    }
}
