//! Route handlers for the studio API.

pub mod doodle;
pub mod gallery;
pub mod generate;
pub mod health;
pub mod profile;
pub mod status;
pub mod tickets;
pub mod user_images;

use axum::routing::{get, post};
use axum::Router;
use database::ImageKind;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Generation
        .route("/api/generate", post(generate::generate))
        .route("/api/generate/status/:id", get(status::status))
        .route("/api/generate/stream/:id", get(status::stream))
        .route("/api/doodle-to-reality", post(doodle::doodle_to_reality))
        // Gallery
        .route("/api/gallery", get(gallery::list))
        .route("/api/gallery/:id", get(gallery::detail))
        .route(
            "/api/gallery/:id/comments",
            post(gallery::add_comment).delete(gallery::delete_comment),
        )
        .route(
            "/api/gallery/:id/likes",
            post(gallery::like).delete(gallery::unlike),
        )
        // Account
        .route("/api/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/api/tickets", get(tickets::balance).post(tickets::grant))
        .route("/api/user/images", get(user_images::list))
        .route(
            "/api/images/:id/toggle-public",
            post(user_images::toggle_public),
        )
        .route(
            "/api/user/images/:id/toggle-public",
            post(user_images::toggle_public),
        )
}

/// Parse the `type` parameter; absent means portraits.
pub(crate) fn parse_kind(value: Option<&str>) -> Result<ImageKind> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(ImageKind::Avatar),
        Some(value) => value
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("지원하지 않는 이미지 종류입니다: {value}"))),
    }
}

/// Parse a listing `type` filter. Absent, blank or `all` (any case) means both kinds.
pub(crate) fn parse_kinds(value: Option<&str>) -> Result<Vec<ImageKind>> {
    match value.map(str::trim) {
        None | Some("") => Ok(vec![ImageKind::Avatar, ImageKind::Doodle]),
        Some(value) if value.eq_ignore_ascii_case("all") => {
            Ok(vec![ImageKind::Avatar, ImageKind::Doodle])
        }
        Some(value) => Ok(vec![parse_kind(Some(value))?]),
    }
}

/// A required text field, trimmed. Numbers are accepted as their decimal text.
pub(crate) fn required_text(field: &str, value: Option<&Value>) -> Result<String> {
    let text = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if text.is_empty() {
        return Err(ApiError::missing(field));
    }
    Ok(text)
}
