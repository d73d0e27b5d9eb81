//! OpenAI-backed image generator.
//!
//! Sends the source image and prompt to the `images/edits` endpoint
//! (model `gpt-image-1` by default) and returns the decoded result.
//!
//! # Usage
//!
//! ```rust,no_run
//! use openai_imager::{EditRequest, ImageGenerator, OpenAiImager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let imager = OpenAiImager::from_env()?;
//!     let photo = std::fs::read("me.png")?;
//!     let edited = imager.edit(EditRequest::new("as an astronaut", photo)).await?;
//!     std::fs::write("future.png", edited.bytes)?;
//!     Ok(())
//! }
//! ```

mod api_types;
mod config;
mod imager;

pub use config::{OpenAiImagerConfig, OpenAiImagerConfigBuilder};
pub use imager::OpenAiImager;

// Re-export studio-core types for convenience
pub use studio_core::{async_trait, EditRequest, EditedImage, GenerationError, ImageGenerator};
