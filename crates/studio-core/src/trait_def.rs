//! The ImageGenerator trait definition.

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::request::{EditRequest, EditedImage};

/// A backend that turns a source image and a prompt into a new image.
///
/// This trait is object-safe and is shared as `Arc<dyn ImageGenerator>`.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Edit the source image according to the prompt.
    async fn edit(&self, request: EditRequest) -> Result<EditedImage, GenerationError>;

    /// Get a human-readable name for this generator.
    fn name(&self) -> &str;

    /// Check if the generator can take requests.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}
