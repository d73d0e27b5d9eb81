//! Access-token authentication.
//!
//! Tokens are Supabase-style HS256 JWTs: `sub` is the user id and the
//! audience is `authenticated`. They arrive as `Authorization: Bearer <jwt>`
//! or in the `sb-access-token` cookie.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Audience every accepted token must carry.
pub const AUDIENCE: &str = "authenticated";

/// Cookie the web client keeps its access token in.
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Claims read from an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Expiry, seconds since the epoch.
    pub exp: usize,
    pub aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Verify a token and return its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUDIENCE]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            ApiError::Unauthorized
        })
}

/// Find the raw token in the request headers.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
}

impl AuthUser {
    /// Reject a client-supplied user id that names someone else.
    pub fn ensure_matches(&self, claimed: Option<&str>) -> Result<(), ApiError> {
        match claimed.map(str::trim).filter(|c| !c.is_empty()) {
            Some(claimed) if claimed != self.id => {
                tracing::warn!(user_id = %self.id, claimed, "User id does not match token");
                Err(ApiError::Unauthorized)
            }
            _ => Ok(()),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or(ApiError::Unauthorized)?;
        let claims = verify_token(&token, &state.config.jwt_secret)?;
        Ok(AuthUser { id: claims.sub })
    }
}

/// A caller that may be anonymous. Invalid tokens count as anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn id(&self) -> Option<&str> {
        self.0.as_ref().map(|user| user.id.as_str())
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = token_from_parts(parts)
            .and_then(|token| verify_token(&token, &state.config.jwt_secret).ok())
            .map(|claims| AuthUser { id: claims.sub });
        Ok(MaybeAuthUser(user))
    }
}
