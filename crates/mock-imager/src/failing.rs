//! Failing imager - every call errors.

use studio_core::{async_trait, EditRequest, EditedImage, GenerationError, ImageGenerator};

/// A generator that always fails the same way.
#[derive(Debug, Clone)]
pub struct FailingImager {
    status: u16,
    message: String,
}

impl FailingImager {
    /// Fail with an upstream-style API error.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl Default for FailingImager {
    fn default() -> Self {
        Self::new(500, "mock failure")
    }
}

#[async_trait]
impl ImageGenerator for FailingImager {
    async fn edit(&self, _request: EditRequest) -> Result<EditedImage, GenerationError> {
        Err(GenerationError::Api {
            status: self.status,
            message: self.message.clone(),
        })
    }

    fn name(&self) -> &str {
        "FailingImager"
    }

    async fn is_ready(&self) -> bool {
        false
    }
}
