//! Doodle to reality.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use database::{doodle_image, ticket, DoodleImage, ImageKind, NewDoodleImage};
use image_tools::decode_image_payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storage::DOODLE_BUCKET;
use studio_core::{doodle_prompt, DoodleStyle, EditRequest};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::jobs;
use crate::routes::required_text;
use crate::state::AppState;
use crate::status_hub::StatusUpdate;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoodleRequest {
    /// Base64 or data-URL drawing.
    pub doodle: Option<Value>,
    pub style: Option<Value>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoodleResponse {
    pub success: bool,
    pub image_url: Option<String>,
    pub image_id: String,
}

/// Render a child's doodle in the chosen style.
///
/// The uploaded drawing is stored next to the result so the gallery can show
/// both. The row is created first, so a failed upload or render leaves it in
/// `error` with the ticket refunded. No stock fallback.
pub async fn doodle_to_reality(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<DoodleRequest>, JsonRejection>,
) -> Result<Json<DoodleResponse>> {
    let Json(request) = payload?;
    user.ensure_matches(request.user_id.as_deref())?;

    let doodle = required_text("doodle", request.doodle.as_ref())?;
    let style: DoodleStyle = required_text("style", request.style.as_ref())?.parse()?;
    let doodle = decode_image_payload(&doodle)?;
    let prepared = jobs::prepare(doodle.bytes.clone()).await?;
    let prompt = doodle_prompt(style);

    let pool = state.db.pool();
    ticket::ensure_account(pool, &user.id, state.config.initial_tickets).await?;

    let job_id = Uuid::new_v4().to_string();
    let remaining = ticket::use_ticket(pool, &user.id, &job_id).await?;
    info!(job_id = %job_id, user_id = %user.id, style = %style, remaining, "Doodle render started");

    let original_key = format!(
        "{}/{}-original.{}",
        user.id,
        job_id,
        jobs::extension(doodle.mime_type)
    );
    let row = NewDoodleImage {
        id: job_id.clone(),
        user_id: user.id.clone(),
        original_url: state.store.public_url(DOODLE_BUCKET, &original_key),
        style: style.as_str().to_string(),
        prompt: prompt.clone(),
    };
    let created = match doodle_image::create(pool, &row).await {
        Ok(created) => created,
        Err(e) => {
            jobs::refund(&state, &user.id, &job_id).await;
            return Err(e.into());
        }
    };
    state.hub.publish(StatusUpdate::from(&created));

    let task = {
        let state = state.clone();
        let user_id = user.id.clone();
        let job_id = job_id.clone();
        tokio::spawn(async move {
            let result: Result<DoodleImage> = async {
                state
                    .store
                    .put(DOODLE_BUCKET, &original_key, doodle.bytes, doodle.mime_type)
                    .await?;
                render(&state, &user_id, &job_id, prompt, prepared).await
            }
            .await;
            if let Err(e) = &result {
                jobs::fail_job(&state, ImageKind::Doodle, &user_id, &job_id, e).await;
            }
            result
        })
    };
    let rendered = task
        .await
        .map_err(|e| ApiError::Internal(format!("render task failed: {e}")))??;

    info!(job_id = %job_id, user_id = %user.id, "Doodle render completed");
    Ok(Json(DoodleResponse {
        success: true,
        image_url: rendered.result_url,
        image_id: rendered.id,
    }))
}

async fn render(
    state: &AppState,
    user_id: &str,
    job_id: &str,
    prompt: String,
    doodle: Vec<u8>,
) -> Result<DoodleImage> {
    let edited = state.generator.edit(EditRequest::new(prompt, doodle)).await?;
    let (bytes, mime_type) = jobs::finish(state, edited).await?;

    let key = format!("{user_id}/{job_id}.{}", jobs::extension(&mime_type));
    let url = state.store.put(DOODLE_BUCKET, &key, bytes, &mime_type).await?;

    let doodle = doodle_image::mark_completed(state.db.pool(), job_id, &url).await?;
    state.hub.publish(StatusUpdate::from(&doodle));
    Ok(doodle)
}
