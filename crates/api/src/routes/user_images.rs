//! The caller's own images and their visibility.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use database::GalleryImage;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::routes::{parse_kind, parse_kinds};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserImagesResponse {
    pub success: bool,
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub success: bool,
    pub is_public: bool,
}

/// Every image the caller owns, newest first. Without `type`, both kinds.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    query: std::result::Result<Query<TypeQuery>, QueryRejection>,
) -> Result<Json<UserImagesResponse>> {
    let Query(query) = query?;
    let kinds = parse_kinds(query.kind.as_deref())?;

    let mut images = Vec::new();
    for kind in kinds {
        images.extend(
            kind.repository()
                .list_for_user(state.db.pool(), &user.id)
                .await?,
        );
    }
    images.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

    Ok(Json(UserImagesResponse {
        success: true,
        images,
    }))
}

/// Flip an owned image between public and private.
pub async fn toggle_public(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    query: std::result::Result<Query<TypeQuery>, QueryRejection>,
) -> Result<Json<ToggleResponse>> {
    let Query(query) = query?;
    let repository = parse_kind(query.kind.as_deref())?.repository();

    let is_public = repository
        .toggle_visibility(state.db.pool(), &id, &user.id)
        .await
        .map_err(|e| match e {
            database::DatabaseError::NotFound { .. } => {
                ApiError::NotFound("이미지를 찾을 수 없습니다.".to_string())
            }
            other => other.into(),
        })?;

    Ok(Json(ToggleResponse {
        success: true,
        is_public,
    }))
}
