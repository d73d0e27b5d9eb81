//! Core trait and types for image generators.
//!
//! This crate provides the shared interface between the HTTP layer and the
//! image model backends. It defines:
//!
//! - [`ImageGenerator`] - The trait every backend implements
//! - [`EditRequest`] / [`EditedImage`] - Input and output of an edit
//! - [`GenerationError`] - Error types for generation
//! - [`choices`] - Typed user choices parsed from Korean or English labels
//! - [`prompt`] - Prompt assembly for portraits and doodles
//! - [`stock`] - Stock photos used when a portrait cannot be generated
//!
//! # Example
//!
//! ```rust
//! use studio_core::{async_trait, EditRequest, EditedImage, GenerationError, ImageGenerator};
//!
//! struct Passthrough;
//!
//! #[async_trait]
//! impl ImageGenerator for Passthrough {
//!     async fn edit(&self, request: EditRequest) -> Result<EditedImage, GenerationError> {
//!         Ok(EditedImage::png(request.image))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Passthrough"
//!     }
//! }
//! ```

pub mod choices;
mod error;
pub mod prompt;
mod request;
pub mod stock;
mod trait_def;

pub use choices::{Age, ArtStyle, ChoiceError, DoodleStyle, Gender, Job, Layout};
pub use error::GenerationError;
pub use prompt::{doodle_prompt, portrait_prompt, PortraitChoices};
pub use request::{EditRequest, EditedImage};
pub use trait_def::ImageGenerator;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
