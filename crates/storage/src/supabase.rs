//! Supabase Storage backend.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Result, StorageError};
use crate::key::validate_key;
use crate::ObjectStore;

/// Connection settings for Supabase Storage.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Service role key.
    pub service_key: String,
    /// Upload timeout.
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `SUPABASE_URL` - Project URL
    /// - `SUPABASE_SERVICE_KEY` - Service role key
    pub fn from_env() -> Result<Self> {
        let url = env::var("SUPABASE_URL")
            .map_err(|_| StorageError::Configuration("SUPABASE_URL not set".to_string()))?;
        let service_key = env::var("SUPABASE_SERVICE_KEY")
            .map_err(|_| StorageError::Configuration("SUPABASE_SERVICE_KEY not set".to_string()))?;
        Ok(Self::new(url, service_key))
    }
}

/// Error body returned by the Storage API.
#[derive(Debug, Deserialize)]
struct StorageApiError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Objects stored through the Supabase Storage REST API.
pub struct SupabaseStorage {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        if config.url.is_empty() || config.service_key.is_empty() {
            return Err(StorageError::Configuration(
                "Supabase URL and service key are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(url = %config.url, "Supabase storage initialized");
        Ok(Self { client, config })
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.config.url, bucket, key)
    }

    async fn check(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StorageApiError>(&body)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or(body);

        Err(StorageError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        validate_key(bucket, key)?;
        let size = bytes.len();

        let response = self
            .client
            .post(self.object_url(bucket, key))
            .bearer_auth(&self.config.service_key)
            .header("apikey", &self.config.service_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Network(format!("Upload failed: {}", e)))?;

        Self::check(response).await?;

        tracing::debug!(bucket, key, size, "Uploaded object to Supabase");
        Ok(self.public_url(bucket, key))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        validate_key(bucket, key)?;

        let response = self
            .client
            .delete(self.object_url(bucket, key))
            .bearer_auth(&self.config.service_key)
            .header("apikey", &self.config.service_key)
            .send()
            .await
            .map_err(|e| StorageError::Network(format!("Delete failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response).await
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.url, bucket, key
        )
    }

    fn name(&self) -> &str {
        "supabase"
    }
}
