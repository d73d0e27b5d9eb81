//! Ticket balance and admin grants.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use database::ticket;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Header carrying the grant token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Largest single grant.
pub const MAX_GRANT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRequest {
    pub amount: Option<i64>,
    /// Recipient; defaults to the authenticated caller.
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TicketsResponse {
    pub success: bool,
    pub tickets: i64,
}

/// The caller's remaining tickets. New accounts start with the initial grant.
pub async fn balance(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<TicketsResponse>> {
    let tickets =
        ticket::ensure_account(state.db.pool(), &user.id, state.config.initial_tickets).await?;
    Ok(Json(TicketsResponse {
        success: true,
        tickets,
    }))
}

/// Add tickets to an account. Requires the admin token.
pub async fn grant(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    headers: HeaderMap,
    payload: std::result::Result<Json<GrantRequest>, JsonRejection>,
) -> Result<Json<TicketsResponse>> {
    let presented = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim);
    match (state.config.admin_token.as_deref(), presented) {
        (Some(expected), Some(presented)) if expected == presented => {}
        _ => {
            warn!("Ticket grant refused");
            return Err(ApiError::Unauthorized);
        }
    }

    let Json(request) = payload?;
    let amount = request.amount.ok_or_else(|| ApiError::missing("amount"))?;
    if !(1..=MAX_GRANT).contains(&amount) {
        return Err(ApiError::BadRequest(format!(
            "티켓 수량은 1에서 {MAX_GRANT} 사이여야 합니다."
        )));
    }

    let user_id = request
        .user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .or_else(|| caller.id().map(str::to_string))
        .ok_or_else(|| ApiError::missing("userId"))?;

    let tickets = ticket::add_tickets(state.db.pool(), &user_id, amount).await?;
    info!(user_id = %user_id, amount, tickets, "Tickets granted");

    Ok(Json(TicketsResponse {
        success: true,
        tickets,
    }))
}
