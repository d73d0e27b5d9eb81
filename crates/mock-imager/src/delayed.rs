//! Delayed imager - wraps another generator with artificial delay.

use std::time::Duration;

use studio_core::{async_trait, EditRequest, EditedImage, GenerationError, ImageGenerator};
use tokio::time::sleep;

/// A generator that waits before delegating.
///
/// Useful for observing the `processing` state while a request is in flight.
pub struct DelayedImager<G: ImageGenerator> {
    inner: G,
    delay: Duration,
}

impl<G: ImageGenerator> DelayedImager<G> {
    /// Create a DelayedImager wrapping the given generator.
    pub fn new(inner: G, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a generator with a delay in milliseconds.
    pub fn with_millis(inner: G, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<G: ImageGenerator> ImageGenerator for DelayedImager<G> {
    async fn edit(&self, request: EditRequest) -> Result<EditedImage, GenerationError> {
        sleep(self.delay).await;
        self.inner.edit(request).await
    }

    fn name(&self) -> &str {
        "DelayedImager"
    }

    async fn is_ready(&self) -> bool {
        self.inner.is_ready().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EchoImager;
    use std::time::Instant;

    #[tokio::test]
    async fn test_delayed_imager() {
        let imager = DelayedImager::with_millis(EchoImager::new(), 100);

        let start = Instant::now();
        let edited = imager.edit(EditRequest::new("p", vec![4])).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(edited.bytes, vec![4]);
        assert!(elapsed >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_imager_name() {
        let imager = DelayedImager::with_millis(EchoImager::new(), 0);
        assert_eq!(imager.name(), "DelayedImager");
    }
}
