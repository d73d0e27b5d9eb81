//! OpenAiImager implementation using the OpenAI Images API.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use studio_core::{async_trait, EditRequest, EditedImage, GenerationError, ImageGenerator};
use tracing::{debug, info, warn};

use crate::api_types::{ApiError, ImageData, ImagesResponse};
use crate::config::OpenAiImagerConfig;

/// An image generator backed by OpenAI's `images/edits` endpoint.
pub struct OpenAiImager {
    client: Client,
    config: OpenAiImagerConfig,
}

impl OpenAiImager {
    /// Create a new OpenAiImager with the given configuration.
    pub fn new(config: OpenAiImagerConfig) -> Result<Self, GenerationError> {
        if config.api_key.is_empty() {
            return Err(GenerationError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                GenerationError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            model = %config.model,
            size = %config.size,
            quality = %config.quality,
            "OpenAiImager initialized"
        );

        Ok(Self { client, config })
    }

    /// Create an OpenAiImager from environment variables.
    ///
    /// See [`OpenAiImagerConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, GenerationError> {
        Self::new(OpenAiImagerConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenAiImagerConfig {
        &self.config
    }

    fn build_form(&self, request: EditRequest) -> Result<Form, GenerationError> {
        let image = Part::bytes(request.image)
            .file_name(request.file_name)
            .mime_str(&request.mime_type)
            .map_err(|e| {
                GenerationError::Configuration(format!("Invalid MIME type: {}", e))
            })?;

        Ok(Form::new()
            .text("model", self.config.model.clone())
            .text("prompt", request.prompt)
            .text("size", self.config.size.clone())
            .text("quality", self.config.quality.clone())
            .text("n", "1")
            .part("image", image))
    }

    fn map_send_error(e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Network(format!("Failed to send request: {}", e))
        }
    }

    /// Turn the first returned image into bytes.
    async fn decode_image(&self, data: ImageData) -> Result<Vec<u8>, GenerationError> {
        if let Some(b64) = data.b64_json {
            return BASE64.decode(b64.trim()).map_err(|e| {
                GenerationError::InvalidResponse(format!("Invalid base64 image: {}", e))
            });
        }

        let url = data.url.ok_or_else(|| {
            GenerationError::InvalidResponse("Image response missing b64_json and url".to_string())
        })?;

        debug!(%url, "Downloading generated image");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: "Failed to download generated image".to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            GenerationError::Network(format!("Failed to read generated image: {}", e))
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImager {
    async fn edit(&self, request: EditRequest) -> Result<EditedImage, GenerationError> {
        let url = self.config.edits_url();
        debug!(
            %url,
            prompt_chars = request.prompt.chars().count(),
            image_bytes = request.image.len(),
            "Sending image edit request"
        );

        let form = self.build_form(request)?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            let message = match serde_json::from_str::<ApiError>(&error_text) {
                Ok(api_error) => {
                    let detail = api_error.error;
                    warn!(
                        status = status.as_u16(),
                        error_type = detail.error_type.as_deref().unwrap_or("unknown"),
                        code = detail.code.as_deref().unwrap_or("none"),
                        "Image API rejected the edit"
                    );
                    detail.message
                }
                Err(_) => error_text,
            };

            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ImagesResponse = response.json().await.map_err(|e| {
            GenerationError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        let first = parsed.data.into_iter().next().ok_or_else(|| {
            GenerationError::InvalidResponse("No image data returned".to_string())
        })?;

        let revised_prompt = first.revised_prompt.clone();
        let bytes = self.decode_image(first).await?;

        info!(bytes = bytes.len(), model = %self.config.model, "Image edit completed");

        Ok(EditedImage {
            bytes,
            mime_type: "image/png".to_string(),
            revised_prompt,
        })
    }

    fn name(&self) -> &str {
        "OpenAiImager"
    }

    async fn is_ready(&self) -> bool {
        !self.config.api_key.is_empty()
    }
}
