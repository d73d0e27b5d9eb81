//! Public gallery: listings, detail pages, comments and likes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use database::gallery::list_public_feed;
use database::validation::validate_comment;
use database::{Comment, DatabaseError, GalleryImage, GallerySort, ImageRepository, Page};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{ApiError, Result};
use crate::routes::{parse_kind, parse_kinds};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `all`, `avatar` or `doodle`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub images: Vec<GalleryImage>,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub comment_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub success: bool,
    pub image: GalleryImage,
    pub comments: Vec<Comment>,
    pub liked: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub success: bool,
    pub comment: Comment,
}

#[derive(Debug, Default, Deserialize)]
pub struct LikeRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub success: bool,
    pub liked: bool,
    pub like_count: i64,
}

fn not_found() -> ApiError {
    ApiError::NotFound("이미지를 찾을 수 없습니다.".to_string())
}

/// An image the viewer may see: public ones, or their own.
async fn visible_image(
    state: &AppState,
    repository: &dyn ImageRepository,
    id: &str,
    viewer: Option<&str>,
) -> Result<GalleryImage> {
    let image = match repository.fetch_by_id(state.db.pool(), id).await {
        Ok(image) => image,
        Err(DatabaseError::NotFound { .. }) => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };

    if image.is_public || viewer == Some(image.user_id.as_str()) {
        Ok(image)
    } else {
        Err(not_found())
    }
}

/// Public images, newest or most liked first.
pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>> {
    let Query(query) = query?;

    let kinds = parse_kinds(query.kind.as_deref())?;
    let sort = match query.sort.as_deref() {
        Some(sort) => sort
            .parse::<GallerySort>()
            .map_err(|_| ApiError::BadRequest(format!("지원하지 않는 정렬입니다: {sort}")))?,
        None => GallerySort::default(),
    };
    let page = Page::new(query.page, query.limit);

    let images = list_public_feed(state.db.pool(), &kinds, sort, page).await?;

    Ok(Json(ListResponse {
        success: true,
        images,
        page: page.page,
        limit: page.limit,
    }))
}

/// One image with its comments. Counts a view.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    viewer: MaybeAuthUser,
    query: std::result::Result<Query<KindQuery>, QueryRejection>,
) -> Result<Json<DetailResponse>> {
    let Query(query) = query?;
    let repository = parse_kind(query.kind.as_deref())?.repository();
    let pool = state.db.pool();

    let mut image = visible_image(&state, repository, &id, viewer.id()).await?;
    image.view_count = repository.record_view(pool, &id, viewer.id()).await?;

    let comments = repository.list_comments(pool, &id).await?;
    let likes = repository.like_state(pool, &id, viewer.id()).await?;
    image.like_count = likes.like_count;

    Ok(Json(DetailResponse {
        success: true,
        image,
        comments,
        liked: likes.liked,
    }))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    payload: std::result::Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<CommentResponse>> {
    let Json(request) = payload?;
    let repository = parse_kind(request.kind.as_deref())?.repository();
    let content = request.content.unwrap_or_default();
    validate_comment(&content)?;

    visible_image(&state, repository, &id, Some(&user.id)).await?;
    let comment = repository
        .add_comment(state.db.pool(), &id, &user.id, &content)
        .await?;
    info!(image_id = %id, user_id = %user.id, kind = %repository.kind(), "Comment posted");

    Ok(Json(CommentResponse {
        success: true,
        comment,
    }))
}

/// Delete one of the caller's own comments.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    query: std::result::Result<Query<KindQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>> {
    let Query(query) = query?;
    let repository = parse_kind(query.kind.as_deref())?.repository();
    let comment_id = query
        .comment_id
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::missing("commentId"))?;

    match repository
        .delete_comment(state.db.pool(), &id, comment_id, &user.id)
        .await
    {
        Ok(()) => Ok(Json(serde_json::json!({ "success": true }))),
        Err(DatabaseError::NotFound { .. }) => {
            Err(ApiError::NotFound("댓글을 찾을 수 없습니다.".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    query: std::result::Result<Query<KindQuery>, QueryRejection>,
    body: Option<Json<LikeRequest>>,
) -> Result<Json<LikeResponse>> {
    let Query(query) = query?;
    let kind = body
        .and_then(|Json(body)| body.kind)
        .or(query.kind);
    let repository = parse_kind(kind.as_deref())?.repository();

    visible_image(&state, repository, &id, Some(&user.id)).await?;
    let likes = repository.add_like(state.db.pool(), &id, &user.id).await?;

    Ok(Json(LikeResponse {
        success: true,
        liked: likes.liked,
        like_count: likes.like_count,
    }))
}

pub async fn unlike(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    query: std::result::Result<Query<KindQuery>, QueryRejection>,
) -> Result<Json<LikeResponse>> {
    let Query(query) = query?;
    let repository = parse_kind(query.kind.as_deref())?.repository();

    visible_image(&state, repository, &id, Some(&user.id)).await?;
    let likes = repository.remove_like(state.db.pool(), &id, &user.id).await?;

    Ok(Json(LikeResponse {
        success: true,
        liked: likes.liked,
        like_count: likes.like_count,
    }))
}
