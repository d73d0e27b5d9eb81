//! Mock image generators.
//!
//! This crate provides mock implementations of the `ImageGenerator` trait for
//! tests and local development:
//! - `EchoImager` - Returns the source image unchanged
//! - `FailingImager` - Always fails with a configured error
//! - `DelayedImager` - Wraps another generator with artificial delay
//! - `RecordingImager` - Wraps another generator and records every call
//!
//! For real generation, use the `openai-imager` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_imager::{EchoImager, EditRequest, ImageGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_imager::GenerationError> {
//!     let imager = EchoImager::new();
//!
//!     let edited = imager.edit(EditRequest::new("make it pop", vec![1, 2, 3])).await?;
//!     assert_eq!(edited.bytes, vec![1, 2, 3]);
//!     Ok(())
//! }
//! ```

mod delayed;
mod echo;
mod failing;
mod recording;

// Re-export studio-core types for convenience
pub use studio_core::{async_trait, EditRequest, EditedImage, GenerationError, ImageGenerator};

pub use delayed::DelayedImager;
pub use echo::EchoImager;
pub use failing::FailingImager;
pub use recording::RecordingImager;
