//! Configuration for OpenAiImager.

use std::env;
use std::time::Duration;

use studio_core::GenerationError;

/// Configuration for OpenAiImager.
#[derive(Debug, Clone)]
pub struct OpenAiImagerConfig {
    /// OpenAI API URL, without the `/v1` suffix.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Image model name.
    pub model: String,

    /// Output size, e.g. `1024x1024`.
    pub size: String,

    /// Output quality: `low`, `medium`, `high` or `auto`.
    pub quality: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for OpenAiImagerConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-image-1".to_string(),
            size: "1024x1024".to_string(),
            quality: "medium".to_string(),
            timeout: Duration::from_secs(180),
        }
    }
}

impl OpenAiImagerConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `OPENAI_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `OPENAI_API_URL` - API URL (default: https://api.openai.com)
    /// - `OPENAI_IMAGE_MODEL` - Model name (default: gpt-image-1)
    /// - `OPENAI_IMAGE_SIZE` - Output size (default: 1024x1024)
    /// - `OPENAI_IMAGE_QUALITY` - Output quality (default: medium)
    /// - `OPENAI_TIMEOUT_SECS` - Request timeout in seconds (default: 180)
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerationError::Configuration("OPENAI_API_KEY not set".to_string()))?;

        let defaults = Self::default();

        let api_url = env::var("OPENAI_API_URL").unwrap_or(defaults.api_url);
        let model = env::var("OPENAI_IMAGE_MODEL").unwrap_or(defaults.model);
        let size = env::var("OPENAI_IMAGE_SIZE").unwrap_or(defaults.size);
        let quality = env::var("OPENAI_IMAGE_QUALITY").unwrap_or(defaults.quality);

        let timeout = env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            size,
            quality,
            timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> OpenAiImagerConfigBuilder {
        OpenAiImagerConfigBuilder::default()
    }

    /// Full URL of the edits endpoint.
    pub fn edits_url(&self) -> String {
        format!("{}/v1/images/edits", self.api_url.trim_end_matches('/'))
    }
}

/// Builder for OpenAiImagerConfig.
#[derive(Debug, Default)]
pub struct OpenAiImagerConfigBuilder {
    config: OpenAiImagerConfig,
}

impl OpenAiImagerConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the output size.
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.config.size = size.into();
        self
    }

    /// Set the output quality.
    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.config.quality = quality.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OpenAiImagerConfig {
        self.config
    }
}
