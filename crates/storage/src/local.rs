//! Filesystem-backed object store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::key::validate_key;
use crate::ObjectStore;

/// Stores objects as files under `root/<bucket>/<key>`.
///
/// URLs point at `<public_base>/storage/<bucket>/<key>`, which the API serves
/// from the same directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        let public_base = public_base.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_base,
        }
    }

    /// Directory objects are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        validate_key(bucket, key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let size = bytes.len();
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(bucket, key, size, content_type, "Stored object on disk");
        Ok(self.public_url(bucket, key))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/{}/{}", self.public_base, bucket, key)
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;

    #[tokio::test]
    async fn test_put_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "http://localhost:3000/");

        let url = store
            .put("generated-images", "u1/img.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/storage/generated-images/u1/img.png");
        let written = std::fs::read(dir.path().join("generated-images/u1/img.png")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "http://x");

        store.put("b", "k.png", vec![1], "image/png").await.unwrap();
        store.put("b", "k.png", vec![2], "image/png").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("b/k.png")).unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().join("root"), "http://x");

        let result = store.put("b", "../escape.png", vec![1], "image/png").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
        assert!(!dir.path().join("escape.png").exists());
        assert!(!dir.path().join("root/escape.png").exists());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "http://x");

        store.put("b", "k.png", vec![1], "image/png").await.unwrap();
        store.delete("b", "k.png").await.unwrap();
        store.delete("b", "k.png").await.unwrap();
        assert!(!dir.path().join("b/k.png").exists());
    }
}
