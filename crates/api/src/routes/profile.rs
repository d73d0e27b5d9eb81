//! The caller's own profile.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use database::profile::{ensure_profile, update_profile as save_profile};
use database::validation::{validate_full_name, validate_url, validate_username};
use database::{Profile, ProfileUpdate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// Partial update. Blank strings are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileRequest {
    fn into_update(self) -> Result<ProfileUpdate> {
        let present = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let update = ProfileUpdate {
            username: present(self.username),
            full_name: present(self.full_name),
            avatar_url: present(self.avatar_url),
        };
        if let Some(username) = &update.username {
            validate_username(username)?;
        }
        if let Some(full_name) = &update.full_name {
            validate_full_name(full_name)?;
        }
        if let Some(avatar_url) = &update.avatar_url {
            validate_url(avatar_url)?;
        }
        Ok(update)
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: Profile,
}

/// The caller's profile, created on first access.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>> {
    let profile = ensure_profile(state.db.pool(), &user.id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(request) = payload?;
    let update = request.into_update()?;

    let profile = save_profile(state.db.pool(), &user.id, &update).await?;
    info!(user_id = %user.id, "Profile updated");

    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_blank_fields_are_ignored() {
        let update = ProfileRequest {
            username: Some("  ".to_string()),
            full_name: Some(" 김돌핀 ".to_string()),
            avatar_url: None,
        }
        .into_update()
        .unwrap();

        assert!(update.username.is_none());
        assert_eq!(update.full_name.as_deref(), Some("김돌핀"));
    }

    #[test]
    fn test_invalid_fields_are_rejected() {
        let bad_name = ProfileRequest {
            username: Some("no spaces allowed".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad_name.into_update(), Err(ApiError::BadRequest(_))));

        let bad_url = ProfileRequest {
            avatar_url: Some("ftp://example.com/a.png".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad_url.into_update(), Err(ApiError::BadRequest(_))));
    }
}
