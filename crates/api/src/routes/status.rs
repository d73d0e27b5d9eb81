//! Generation status: one-shot polling and a server-sent event stream.

use std::time::Duration;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use database::{Database, DatabaseError, GenerationStatus, ImageKind};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::auth::MaybeAuthUser;
use crate::error::{ApiError, Result};
use crate::routes::parse_kind;
use crate::state::AppState;
use crate::status_hub::{load_status, StatusUpdate};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ImageKind,
    pub status: GenerationStatus,
    pub image_url: Option<String>,
    pub error: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("이미지를 찾을 수 없습니다.".to_string())
}

/// Current status of a generation.
///
/// `userId`, when given, must be the token's user (if any) and the row's owner.
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    viewer: MaybeAuthUser,
    query: std::result::Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<StatusResponse>> {
    let Query(query) = query?;
    let kind = parse_kind(query.kind.as_deref())?;
    if let Some(user) = &viewer.0 {
        user.ensure_matches(query.user_id.as_deref())?;
    }

    let (update, owner) = match load_status(&state.db, kind, &id).await {
        Ok(found) => found,
        Err(DatabaseError::NotFound { .. }) => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };
    if query.user_id.as_deref().is_some_and(|claimed| claimed != owner) {
        return Err(not_found());
    }

    Ok(Json(StatusResponse {
        success: true,
        id: update.id,
        kind: update.kind,
        status: update.status,
        image_url: update.image_url,
        error: update.error,
    }))
}

/// Stream status snapshots for one generation until it is terminal.
///
/// The first event is the current row. After that, updates come from the
/// status hub, with a periodic re-read catching changes made elsewhere.
pub async fn stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: std::result::Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Sse<impl tokio_stream::Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let Query(query) = query?;
    let kind = parse_kind(query.kind.as_deref())?;

    // Subscribe before reading so no update slips between the two.
    let receiver = state.hub.subscribe();
    let (first, _) = match load_status(&state.db, kind, &id).await {
        Ok(found) => found,
        Err(DatabaseError::NotFound { .. }) => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };
    debug!(id = %id, kind = %kind, status = %first.status, "Status stream opened");

    let watch = StatusWatch::new(state.db.clone(), first, receiver, state.config.sse_poll_interval);
    let events = futures::stream::unfold(watch, |mut watch| async move {
        let update = watch.next().await?;
        Some((Event::default().json_data(&update), watch))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

enum Wake {
    Received(std::result::Result<StatusUpdate, RecvError>),
    Tick,
}

/// Follows one generation row and yields each distinct snapshot.
struct StatusWatch {
    db: Database,
    receiver: broadcast::Receiver<StatusUpdate>,
    ticker: Interval,
    /// Snapshot not yet sent.
    pending: Option<StatusUpdate>,
    last: StatusUpdate,
    finished: bool,
}

impl StatusWatch {
    fn new(
        db: Database,
        first: StatusUpdate,
        receiver: broadcast::Receiver<StatusUpdate>,
        period: Duration,
    ) -> Self {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            db,
            receiver,
            ticker,
            pending: Some(first.clone()),
            last: first,
            finished: false,
        }
    }

    fn matches(&self, update: &StatusUpdate) -> bool {
        update.id == self.last.id && update.kind == self.last.kind
    }

    /// Next snapshot to send, or `None` once the stream should end.
    async fn next(&mut self) -> Option<StatusUpdate> {
        if self.finished {
            return None;
        }
        if let Some(first) = self.pending.take() {
            self.finished = first.is_terminal();
            return Some(first);
        }

        loop {
            let wake = tokio::select! {
                received = self.receiver.recv() => Wake::Received(received),
                _ = self.ticker.tick() => Wake::Tick,
            };

            let candidate = match wake {
                Wake::Received(Ok(update)) if self.matches(&update) => Some(update),
                Wake::Received(Ok(_)) => None,
                Wake::Received(Err(RecvError::Lagged(skipped))) => {
                    debug!(skipped, "Status stream lagged, re-reading row");
                    self.reload().await?
                }
                Wake::Received(Err(RecvError::Closed)) => return None,
                Wake::Tick => self.reload().await?,
            };

            if let Some(update) = candidate {
                if update != self.last {
                    self.last = update.clone();
                    self.finished = update.is_terminal();
                    return Some(update);
                }
            }
        }
    }

    /// Re-read the row. Outer `None` ends the stream; inner `None` means
    /// nothing could be read this time.
    async fn reload(&self) -> Option<Option<StatusUpdate>> {
        match load_status(&self.db, self.last.kind, &self.last.id).await {
            Ok((update, _)) => Some(Some(update)),
            Err(DatabaseError::NotFound { .. }) => None,
            Err(e) => {
                warn!(id = %self.last.id, error = %e, "Status re-read failed");
                Some(None)
            }
        }
    }
}
