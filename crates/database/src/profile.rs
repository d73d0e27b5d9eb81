//! Profile storage.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Profile;

/// Partial profile update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.full_name.is_none() && self.avatar_url.is_none()
    }
}

/// Get a user's profile.
pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> Result<Option<Profile>> {
    let record = sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, username, full_name, avatar_url, created_at, updated_at
        FROM profiles
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Get a user's profile, creating an empty one on first access.
pub async fn ensure_profile(pool: &SqlitePool, user_id: &str) -> Result<Profile> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id)
        VALUES (?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    get_profile(pool, user_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Profile",
            id: user_id.to_string(),
        })
}

/// Apply a partial update, creating the profile if needed.
///
/// A username taken by another user yields `AlreadyExists`.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<Profile> {
    ensure_profile(pool, user_id).await?;

    if update.is_empty() {
        return ensure_profile(pool, user_id).await;
    }

    sqlx::query(
        r#"
        UPDATE profiles
        SET username = COALESCE(?, username),
            full_name = COALESCE(?, full_name),
            avatar_url = COALESCE(?, avatar_url),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(update.username.as_deref())
    .bind(update.full_name.as_deref())
    .bind(update.avatar_url.as_deref())
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::from_insert(e, "Username", update.username.clone().unwrap_or_default())
    })?;

    ensure_profile(pool, user_id).await
}
