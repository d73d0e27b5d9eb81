//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    /// `ok`, or `degraded` when the generator cannot take requests.
    pub status: String,
    pub generator: String,
    pub generator_ready: bool,
    pub storage: String,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let ready = state.generator.is_ready().await;
    Json(Health {
        status: if ready { "ok" } else { "degraded" }.to_string(),
        generator: state.generator.name().to_string(),
        generator_ready: ready,
        storage: state.store.name().to_string(),
    })
}
