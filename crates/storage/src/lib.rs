//! Object storage for uploaded and generated images.
//!
//! [`ObjectStore`] is the seam the API writes through. Two backends:
//!
//! - [`LocalObjectStore`] - files under a directory, served by the API itself
//! - [`SupabaseStorage`] - the Supabase Storage REST API

mod error;
mod key;
mod local;
mod supabase;

pub use error::{Result, StorageError};
pub use key::validate_key;
pub use local::LocalObjectStore;
pub use supabase::{SupabaseConfig, SupabaseStorage};

use async_trait::async_trait;

/// Bucket for future-self portraits.
pub const AVATAR_BUCKET: &str = "generated-images";

/// Bucket for doodle uploads and renders.
pub const DOODLE_BUCKET: &str = "doodle-images";

/// A place to put public image objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `bucket/key`, replacing any existing object.
    /// Returns the object's public URL.
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String>;

    /// Remove an object. Removing a missing object is not an error.
    async fn delete(&self, bucket: &str, key: &str) -> Result<()>;

    /// Public URL for `bucket/key`.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    /// Human-readable backend name.
    fn name(&self) -> &str;
}
