//! SQLite persistence layer for Dolphin Studio.
//!
//! Profiles, ticket balances with their ledger, portrait and doodle
//! generations, and the gallery tables (comments, likes, views) behind them.
//!
//! # Example
//!
//! ```no_run
//! use database::{ticket, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:dolphin.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let balance = ticket::ensure_account(db.pool(), "user-1", 3).await?;
//!     println!("tickets: {balance}");
//!     Ok(())
//! }
//! ```

pub mod doodle_image;
pub mod error;
pub mod gallery;
pub mod generated_image;
pub mod models;
pub mod profile;
pub mod ticket;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use gallery::{
    GalleryImage, GallerySort, ImageDetails, ImageKind, ImageRepository, LikeState, Page,
};
pub use models::{
    Comment, DoodleImage, GeneratedImage, GenerationStatus, NewDoodleImage, NewGeneratedImage,
    Profile, TicketLedgerEntry,
};
pub use profile::ProfileUpdate;
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// `sqlite::memory:` gives an in-memory database private to this pool.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(url, pool_size, "Connected to database");

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_is_repeatable() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        for expected in ["doodle_images", "generated_images", "profiles", "ticket_ledger", "user_tickets"] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
    }

    #[tokio::test]
    async fn test_memory_databases_are_isolated() {
        let a = Database::connect("sqlite::memory:").await.unwrap();
        let b = Database::connect("sqlite::memory:").await.unwrap();
        a.migrate().await.unwrap();
        b.migrate().await.unwrap();

        ticket::add_tickets(a.pool(), "u1", 5).await.unwrap();
        assert_eq!(ticket::get_remaining(b.pool(), "u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_close_rejects_new_queries() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.close().await;

        assert!(db.pool().is_closed());
        assert!(ticket::get_remaining(db.pool(), "u1").await.is_err());
    }
}
