//! Error types for the HTTP API.
//!
//! Every error renders as `{ "success": false, "error": "<message>" }`.
//! Messages are Korean and user-facing; internal details only reach the logs.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::{DatabaseError, ValidationError};
use image_tools::ImageToolError;
use storage::StorageError;
use studio_core::{ChoiceError, GenerationError};
use thiserror::Error;

/// Shown when the user has no tickets left. Clients match on this text.
pub const INSUFFICIENT_TICKETS: &str = "티켓이 부족합니다.";

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid input; the message is shown to the user.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing, invalid or mismatched credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Missing resource; the message is shown to the user.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// A required request field was absent or blank.
    pub fn missing(field: &str) -> Self {
        ApiError::BadRequest(format!("필수 항목이 누락되었습니다: {field}"))
    }

    /// The message clients see for this error.
    pub fn user_message(&self) -> String {
        self.status_and_message().1
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "로그인이 필요합니다.".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Database(err) => match err {
                DatabaseError::InsufficientTickets { .. } => {
                    (StatusCode::BAD_REQUEST, INSUFFICIENT_TICKETS.to_string())
                }
                DatabaseError::NotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    "요청한 항목을 찾을 수 없습니다.".to_string(),
                ),
                DatabaseError::AlreadyExists { entity: "Username", .. } => (
                    StatusCode::BAD_REQUEST,
                    "이미 사용 중인 사용자 이름입니다.".to_string(),
                ),
                DatabaseError::AlreadyExists { .. } => {
                    (StatusCode::BAD_REQUEST, "이미 존재하는 항목입니다.".to_string())
                }
                // Only the visibility toggle reports on `Image`; a generation row that
                // already finished elsewhere is a server-side conflict.
                DatabaseError::InvalidState { entity: "Image", .. } => (
                    StatusCode::BAD_REQUEST,
                    "완료된 이미지만 공개할 수 있습니다.".to_string(),
                ),
                _ => internal(),
            },
            ApiError::Generation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "이미지 생성에 실패했습니다. 잠시 후 다시 시도해 주세요.".to_string(),
            ),
            ApiError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "이미지 저장에 실패했습니다.".to_string(),
            ),
            ApiError::Internal(_) => internal(),
        }
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "서버 오류가 발생했습니다.".to_string(),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = serde_json::json!({
            "success": false,
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

impl From<ChoiceError> for ApiError {
    fn from(err: ChoiceError) -> Self {
        ApiError::BadRequest(format!("잘못된 선택입니다 ({}): {}", err.field, err.value))
    }
}

impl From<ImageToolError> for ApiError {
    fn from(err: ImageToolError) -> Self {
        match err {
            ImageToolError::Io(e) => ApiError::Internal(e.to_string()),
            _ => ApiError::BadRequest("올바른 이미지 파일이 아닙니다.".to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let message = match err {
            ValidationError::InvalidUsername(_) => {
                "사용자 이름에는 문자, 숫자, '_', '.'만 사용할 수 있습니다.".to_string()
            }
            ValidationError::InvalidUrl(_) => "올바른 URL이 아닙니다.".to_string(),
            ValidationError::TooShort { field, min, .. } => {
                format!("{field}은(는) {min}자 이상이어야 합니다.")
            }
            ValidationError::TooLong { field, max, .. } => {
                format!("{field}은(는) {max}자 이하여야 합니다.")
            }
            ValidationError::Empty(field) => format!("{field}을(를) 입력해 주세요."),
        };
        ApiError::BadRequest(message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        tracing::debug!(error = %err, "Rejected JSON body");
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::BadRequest("업로드한 파일이 너무 큽니다.".to_string());
        }
        ApiError::BadRequest("잘못된 요청 형식입니다.".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        tracing::debug!(error = %err, "Rejected query string");
        ApiError::BadRequest("잘못된 요청 형식입니다.".to_string())
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
