//! Recording imager - counts calls and keeps their prompts.

use std::sync::atomic::{AtomicUsize, Ordering};

use studio_core::{async_trait, EditRequest, EditedImage, GenerationError, ImageGenerator};
use tokio::sync::Mutex;

/// Wraps a generator and records every request it sees.
pub struct RecordingImager<G: ImageGenerator> {
    inner: G,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl<G: ImageGenerator> RecordingImager<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of `edit` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl<G: ImageGenerator> ImageGenerator for RecordingImager<G> {
    async fn edit(&self, request: EditRequest) -> Result<EditedImage, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(request.prompt.clone());
        self.inner.edit(request).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn is_ready(&self) -> bool {
        self.inner.is_ready().await
    }
}
