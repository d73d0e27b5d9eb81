//! Future-self portrait generation.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use database::{generated_image, ticket, GeneratedImage, GenerationStatus, ImageKind, NewGeneratedImage};
use image_tools::decode_image_payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storage::AVATAR_BUCKET;
use studio_core::stock::stock_image_url;
use studio_core::{portrait_prompt, EditRequest, PortraitChoices};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::jobs;
use crate::routes::required_text;
use crate::state::AppState;
use crate::status_hub::StatusUpdate;

/// Portrait request. Every field but `userId` is required.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Base64 or data-URL photo.
    pub photo: Option<Value>,
    pub age: Option<Value>,
    pub gender: Option<Value>,
    pub job: Option<Value>,
    pub style: Option<Value>,
    pub layout: Option<Value>,
    /// Must match the token when present.
    pub user_id: Option<String>,
}

impl GenerateRequest {
    fn choices(&self) -> Result<PortraitChoices> {
        Ok(PortraitChoices {
            job: required_text("job", self.job.as_ref())?.parse()?,
            age: required_text("age", self.age.as_ref())?.parse()?,
            gender: required_text("gender", self.gender.as_ref())?.parse()?,
            style: required_text("style", self.style.as_ref())?.parse()?,
            layout: required_text("layout", self.layout.as_ref())?.parse()?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub job_id: String,
    pub image_url: Option<String>,
    pub status: GenerationStatus,
}

/// Turn a photo into a portrait of the user's future self.
///
/// Validates everything before spending a ticket. Once the ticket is spent,
/// any failure marks the row `error` and refunds it.
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>> {
    let Json(request) = payload?;
    user.ensure_matches(request.user_id.as_deref())?;

    let photo = required_text("photo", request.photo.as_ref())?;
    let choices = request.choices()?;
    let photo = decode_image_payload(&photo)?;
    let photo = jobs::prepare(photo.bytes).await?;
    let prompt = portrait_prompt(&choices);

    let pool = state.db.pool();
    ticket::ensure_account(pool, &user.id, state.config.initial_tickets).await?;

    let job_id = Uuid::new_v4().to_string();
    let remaining = ticket::use_ticket(pool, &user.id, &job_id).await?;
    info!(job_id = %job_id, user_id = %user.id, job = %choices.job, remaining, "Portrait generation started");

    let row = NewGeneratedImage {
        id: job_id.clone(),
        user_id: user.id.clone(),
        job: choices.job.as_str().to_string(),
        age: choices.age.to_string(),
        gender: choices.gender.as_str().to_string(),
        style: choices.style.as_str().to_string(),
        layout: choices.layout.as_str().to_string(),
        prompt: prompt.clone(),
    };
    let created = match generated_image::create(pool, &row).await {
        Ok(created) => created,
        Err(e) => {
            jobs::refund(&state, &user.id, &job_id).await;
            return Err(e.into());
        }
    };
    state.hub.publish(StatusUpdate::from(&created));

    // Runs to completion even if the client disconnects, so the row always
    // reaches a terminal status.
    let task = {
        let state = state.clone();
        let user_id = user.id.clone();
        let job_id = job_id.clone();
        tokio::spawn(async move {
            let result = render(&state, &user_id, &job_id, &choices, prompt, photo).await;
            if let Err(e) = &result {
                jobs::fail_job(&state, ImageKind::Avatar, &user_id, &job_id, e).await;
            }
            result
        })
    };
    let image = task
        .await
        .map_err(|e| ApiError::Internal(format!("generation task failed: {e}")))??;

    info!(job_id = %job_id, user_id = %user.id, "Portrait generation completed");
    Ok(Json(GenerateResponse {
        success: true,
        job_id,
        image_url: image.image_url,
        status: image.status,
    }))
}

async fn render(
    state: &AppState,
    user_id: &str,
    job_id: &str,
    choices: &PortraitChoices,
    prompt: String,
    photo: Vec<u8>,
) -> Result<GeneratedImage> {
    let edited = match state.generator.edit(EditRequest::new(prompt, photo)).await {
        Ok(edited) => edited,
        Err(e) if state.config.stock_fallback => {
            let url = stock_image_url(&choices.job);
            warn!(job_id, error = %e, url = %url, "Generator failed, completing with stock photo");
            return complete(state, job_id, &url).await;
        }
        Err(e) => return Err(e.into()),
    };

    let (bytes, mime_type) = jobs::finish(state, edited).await?;
    let key = format!("{user_id}/{job_id}.{}", jobs::extension(&mime_type));
    let url = state.store.put(AVATAR_BUCKET, &key, bytes, &mime_type).await?;

    complete(state, job_id, &url).await
}

async fn complete(state: &AppState, job_id: &str, url: &str) -> Result<GeneratedImage> {
    let image = generated_image::mark_completed(state.db.pool(), job_id, url).await?;
    state.hub.publish(StatusUpdate::from(&image));
    Ok(image)
}
