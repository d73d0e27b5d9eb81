//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use image_tools::Watermark;
use mock_imager::EchoImager;
use openai_imager::OpenAiImager;
use storage::{LocalObjectStore, ObjectStore, SupabaseConfig, SupabaseStorage};
use studio_core::ImageGenerator;
use tracing::info;

use crate::config::{Config, GeneratorBackend, StorageBackend};
use crate::status_hub::StatusHub;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Image model backend.
    pub generator: Arc<dyn ImageGenerator>,
    /// Where uploads and results are written.
    pub store: Arc<dyn ObjectStore>,
    /// Logo stamped onto finished images, if configured.
    pub watermark: Option<Arc<Watermark>>,
    /// Status fan-out for streams.
    pub hub: StatusHub,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state from already-built parts.
    pub fn new(
        db: Database,
        generator: Arc<dyn ImageGenerator>,
        store: Arc<dyn ObjectStore>,
        config: Config,
    ) -> Self {
        Self {
            db,
            generator,
            store,
            watermark: None,
            hub: StatusHub::default(),
            config: Arc::new(config),
        }
    }

    pub fn with_watermark(mut self, watermark: Watermark) -> Self {
        self.watermark = Some(Arc::new(watermark));
        self
    }

    /// Connect to everything the configuration names.
    pub async fn from_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::connect(&config.database_url).await?;
        db.migrate().await?;

        let generator: Arc<dyn ImageGenerator> = match config.generator {
            GeneratorBackend::OpenAi => Arc::new(OpenAiImager::from_env()?),
            GeneratorBackend::Echo => Arc::new(EchoImager::new()),
        };

        let store: Arc<dyn ObjectStore> = match config.storage {
            StorageBackend::Local => Arc::new(LocalObjectStore::new(
                config.storage_dir.clone(),
                config.public_base_url.clone(),
            )),
            StorageBackend::Supabase => {
                Arc::new(SupabaseStorage::new(SupabaseConfig::from_env()?)?)
            }
        };

        let watermark = match &config.logo_path {
            Some(path) => Some(Watermark::from_path(path)?),
            None => None,
        };

        info!(
            generator = generator.name(),
            storage = store.name(),
            watermark = watermark.is_some(),
            "Application state ready"
        );

        let state = Self::new(db, generator, store, config);
        Ok(match watermark {
            Some(watermark) => state.with_watermark(watermark),
            None => state,
        })
    }
}
