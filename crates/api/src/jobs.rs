//! Steps shared by the portrait and doodle routes: photo preparation,
//! finishing, uploads, and failure bookkeeping after a ticket was spent.

use database::{doodle_image, generated_image, ticket, ImageKind};
use image_tools::{prepare_photo, sniff_mime_type, DEFAULT_MAX_DIMENSION};
use studio_core::EditedImage;
use tracing::{error, info, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::status_hub::StatusUpdate;

/// Resize and sharpen an uploaded photo off the async runtime.
pub(crate) async fn prepare(bytes: Vec<u8>) -> Result<Vec<u8>> {
    let prepared = tokio::task::spawn_blocking(move || prepare_photo(&bytes, DEFAULT_MAX_DIMENSION))
        .await
        .map_err(|e| ApiError::Internal(format!("photo preparation panicked: {e}")))??;
    Ok(prepared)
}

/// Stamp the logo if one is configured. Returns the bytes and their MIME type.
pub(crate) async fn finish(state: &AppState, edited: EditedImage) -> Result<(Vec<u8>, String)> {
    let bytes = match state.watermark.clone() {
        Some(watermark) => {
            let bytes = edited.bytes;
            tokio::task::spawn_blocking(move || watermark.apply(&bytes))
                .await
                .map_err(|e| ApiError::Internal(format!("watermark panicked: {e}")))?
        }
        None => edited.bytes,
    };

    let mime_type = sniff_mime_type(&bytes)
        .map(str::to_string)
        .unwrap_or(edited.mime_type);
    Ok((bytes, mime_type))
}

/// File extension for an image MIME type.
pub(crate) fn extension(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// Mark a row `error`, tell subscribers, and give the ticket back.
///
/// Only logs when a step fails; the caller is already returning an error.
pub(crate) async fn fail_job(
    state: &AppState,
    kind: ImageKind,
    user_id: &str,
    job_id: &str,
    reason: &ApiError,
) {
    let pool = state.db.pool();
    let message = reason.user_message();
    warn!(job_id, user_id, %kind, error = %reason, "Generation failed");

    let update = match kind {
        ImageKind::Avatar => generated_image::mark_failed(pool, job_id, &message)
            .await
            .map(|image| StatusUpdate::from(&image)),
        ImageKind::Doodle => doodle_image::mark_failed(pool, job_id, &message)
            .await
            .map(|doodle| StatusUpdate::from(&doodle)),
    };
    match update {
        Ok(update) => state.hub.publish(update),
        Err(e) => error!(job_id, %kind, error = %e, "Failed to mark job as failed"),
    }

    refund(state, user_id, job_id).await;
}

/// Refund the ticket spent on `job_id`, at most once.
pub(crate) async fn refund(state: &AppState, user_id: &str, job_id: &str) {
    match ticket::refund_ticket(state.db.pool(), user_id, job_id).await {
        Ok(true) => info!(job_id, user_id, "Ticket refunded"),
        Ok(false) => warn!(job_id, user_id, "Ticket already refunded or never charged"),
        Err(e) => error!(job_id, user_id, error = %e, "Ticket refund failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(extension("image/png"), "png");
        assert_eq!(extension("image/jpeg"), "jpg");
        assert_eq!(extension("image/webp"), "webp");
        assert_eq!(extension("application/octet-stream"), "png");
    }
}
