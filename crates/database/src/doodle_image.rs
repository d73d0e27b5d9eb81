//! Doodle-to-reality rows.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{DoodleImage, NewDoodleImage};

const ENTITY: &str = "DoodleImage";

/// Open a doodle row in `processing`.
pub async fn create(pool: &SqlitePool, doodle: &NewDoodleImage) -> Result<DoodleImage> {
    sqlx::query(
        r#"
        INSERT INTO doodle_images (id, user_id, original_url, style, prompt)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&doodle.id)
    .bind(&doodle.user_id)
    .bind(&doodle.original_url)
    .bind(&doodle.style)
    .bind(&doodle.prompt)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::from_insert(e, ENTITY, doodle.id.clone()))?;

    get(pool, &doodle.id).await
}

/// Get a doodle by id.
pub async fn get(pool: &SqlitePool, id: &str) -> Result<DoodleImage> {
    sqlx::query_as::<_, DoodleImage>(
        r#"
        SELECT id, user_id, original_url, result_url, style, prompt, status,
               error_message, is_public, view_count, created_at, updated_at
        FROM doodle_images
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

/// Move a `processing` doodle to `completed`.
pub async fn mark_completed(pool: &SqlitePool, id: &str, result_url: &str) -> Result<DoodleImage> {
    let result = sqlx::query(
        r#"
        UPDATE doodle_images
        SET status = 'completed', result_url = ?, error_message = NULL, updated_at = datetime('now')
        WHERE id = ? AND status = 'processing'
        "#,
    )
    .bind(result_url)
    .bind(id)
    .execute(pool)
    .await?;

    let doodle = get(pool, id).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::InvalidState {
            entity: ENTITY,
            id: id.to_string(),
            reason: "already finished",
        });
    }
    Ok(doodle)
}

/// Move a `processing` doodle to `error`.
pub async fn mark_failed(pool: &SqlitePool, id: &str, message: &str) -> Result<DoodleImage> {
    let result = sqlx::query(
        r#"
        UPDATE doodle_images
        SET status = 'error', error_message = ?, updated_at = datetime('now')
        WHERE id = ? AND status = 'processing'
        "#,
    )
    .bind(message)
    .bind(id)
    .execute(pool)
    .await?;

    let doodle = get(pool, id).await?;
    if result.rows_affected() == 0 {
        return Err(DatabaseError::InvalidState {
            entity: ENTITY,
            id: id.to_string(),
            reason: "already finished",
        });
    }
    Ok(doodle)
}

/// All doodles owned by a user, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<DoodleImage>> {
    let doodles = sqlx::query_as::<_, DoodleImage>(
        r#"
        SELECT id, user_id, original_url, result_url, style, prompt, status,
               error_message, is_public, view_count, created_at, updated_at
        FROM doodle_images
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(doodles)
}
