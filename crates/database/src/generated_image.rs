//! Portrait generation rows.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{GeneratedImage, GenerationStatus, NewGeneratedImage};

const ENTITY: &str = "GeneratedImage";

/// Open a generation row in `processing`.
pub async fn create(pool: &SqlitePool, image: &NewGeneratedImage) -> Result<GeneratedImage> {
    sqlx::query(
        r#"
        INSERT INTO generated_images (id, user_id, job, age, gender, style, layout, prompt)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&image.id)
    .bind(&image.user_id)
    .bind(&image.job)
    .bind(&image.age)
    .bind(&image.gender)
    .bind(&image.style)
    .bind(&image.layout)
    .bind(&image.prompt)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, ENTITY, image.id.clone()))?;

    get(pool, &image.id).await
}

/// Get a generation by id.
pub async fn get(pool: &SqlitePool, id: &str) -> Result<GeneratedImage> {
    sqlx::query_as::<_, GeneratedImage>(
        r#"
        SELECT id, user_id, job, age, gender, style, layout, prompt, status,
               image_url, error_message, is_public, view_count, created_at, updated_at
        FROM generated_images
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: ENTITY,
        id: id.to_string(),
    })
}

/// Move a `processing` row to `completed`.
pub async fn mark_completed(pool: &SqlitePool, id: &str, image_url: &str) -> Result<GeneratedImage> {
    let result = sqlx::query(
        r#"
        UPDATE generated_images
        SET status = 'completed', image_url = ?, error_message = NULL, updated_at = datetime('now')
        WHERE id = ? AND status = 'processing'
        "#,
    )
    .bind(image_url)
    .bind(id)
    .execute(pool)
    .await?;

    finish_transition(pool, id, result.rows_affected()).await
}

/// Move a `processing` row to `error`.
pub async fn mark_failed(pool: &SqlitePool, id: &str, message: &str) -> Result<GeneratedImage> {
    let result = sqlx::query(
        r#"
        UPDATE generated_images
        SET status = 'error', error_message = ?, updated_at = datetime('now')
        WHERE id = ? AND status = 'processing'
        "#,
    )
    .bind(message)
    .bind(id)
    .execute(pool)
    .await?;

    finish_transition(pool, id, result.rows_affected()).await
}

async fn finish_transition(pool: &SqlitePool, id: &str, rows: u64) -> Result<GeneratedImage> {
    let image = get(pool, id).await?;
    if rows == 0 {
        return Err(DatabaseError::InvalidState {
            entity: ENTITY,
            id: id.to_string(),
            reason: "already finished",
        });
    }
    Ok(image)
}

/// All generations owned by a user, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<GeneratedImage>> {
    let images = sqlx::query_as::<_, GeneratedImage>(
        r#"
        SELECT id, user_id, job, age, gender, style, layout, prompt, status,
               image_url, error_message, is_public, view_count, created_at, updated_at
        FROM generated_images
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(images)
}
