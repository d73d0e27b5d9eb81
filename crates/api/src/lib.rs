//! Dolphin Studio HTTP API.
//!
//! Future-self portraits and doodle renders behind a ticket balance, plus the
//! public gallery around them. Built on axum; state is assembled once in
//! [`AppState`] and shared with every handler.
//!
//! # Example
//!
//! ```no_run
//! use api::{router, AppState, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let addr = config.addr;
//!     let state = AppState::from_config(config).await?;
//!
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
mod jobs;
pub mod routes;
pub mod state;
pub mod status_hub;

pub use auth::{AuthUser, Claims, MaybeAuthUser};
pub use config::{Config, ConfigError, GeneratorBackend, StorageBackend};
pub use error::{ApiError, Result};
pub use state::AppState;
pub use status_hub::{StatusHub, StatusUpdate};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// The full application: routes, body limit, request tracing, and the local
/// object store when one is configured.
pub fn router(state: AppState) -> Router {
    let mut app = routes::router();

    if state.config.storage == StorageBackend::Local {
        app = app.nest_service("/storage", ServeDir::new(&state.config.storage_dir));
    }

    app.layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
