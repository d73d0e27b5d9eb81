//! Gallery access for both image kinds.
//!
//! Portraits and doodles live in separate tables with their own comment,
//! like and view tables. [`ImageKind`] is resolved once at the edge and
//! dispatches to a [`ImageRepository`] that knows which tables to touch; the
//! queries themselves are shared.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Comment, GenerationStatus};

/// Which family of images a request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Future-self portraits (`generated_images`).
    Avatar,
    /// Doodle renders (`doodle_images`).
    Doodle,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Avatar => "avatar",
            ImageKind::Doodle => "doodle",
        }
    }

    /// Repository for this kind.
    pub fn repository(&self) -> &'static dyn ImageRepository {
        match self {
            ImageKind::Avatar => &AVATAR_REPOSITORY,
            ImageKind::Doodle => &DOODLE_REPOSITORY,
        }
    }

    fn tables(&self) -> &'static KindTables {
        match self {
            ImageKind::Avatar => &AVATAR_TABLES,
            ImageKind::Doodle => &DOODLE_TABLES,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avatar" | "generated" | "image" => Ok(ImageKind::Avatar),
            "doodle" => Ok(ImageKind::Doodle),
            other => Err(format!("unknown image type: {other}")),
        }
    }
}

/// Ordering for public listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GallerySort {
    /// Newest first.
    #[default]
    Latest,
    /// Most liked, then most viewed.
    Popular,
}

impl FromStr for GallerySort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" | "recent" | "new" => Ok(GallerySort::Latest),
            "popular" | "likes" => Ok(GallerySort::Popular),
            other => Err(format!("unknown sort: {other}")),
        }
    }
}

impl GallerySort {
    fn order_by(&self) -> &'static str {
        match self {
            GallerySort::Latest => "created_at DESC, id DESC",
            GallerySort::Popular => "like_count DESC, view_count DESC, created_at DESC, id DESC",
        }
    }
}

/// 1-based page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 50;

    /// Build a page, clamping out-of-range values.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Kind-specific fields of a gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImageDetails {
    Avatar {
        job: String,
        age: String,
        gender: String,
        style: String,
        layout: String,
    },
    #[serde(rename_all = "camelCase")]
    Doodle { original_url: String, style: String },
}

/// An image as shown in the gallery, with author and engagement counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: String,
    pub user_id: String,
    pub image_url: Option<String>,
    pub status: GenerationStatus,
    pub is_public: bool,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub details: ImageDetails,
}

impl GalleryImage {
    pub fn kind(&self) -> ImageKind {
        match self.details {
            ImageDetails::Avatar { .. } => ImageKind::Avatar,
            ImageDetails::Doodle { .. } => ImageKind::Doodle,
        }
    }
}

/// Flat row shape shared by both kinds' select statements.
#[derive(Debug, FromRow)]
struct GalleryRow {
    id: String,
    user_id: String,
    kind: String,
    image_url: Option<String>,
    status: GenerationStatus,
    is_public: bool,
    view_count: i64,
    like_count: i64,
    comment_count: i64,
    created_at: String,
    username: Option<String>,
    avatar_url: Option<String>,
    job: Option<String>,
    age: Option<String>,
    gender: Option<String>,
    style: Option<String>,
    layout: Option<String>,
    original_url: Option<String>,
}

impl From<GalleryRow> for GalleryImage {
    fn from(row: GalleryRow) -> Self {
        let style = row.style.unwrap_or_default();
        let details = if row.kind == "doodle" {
            ImageDetails::Doodle {
                original_url: row.original_url.unwrap_or_default(),
                style,
            }
        } else {
            ImageDetails::Avatar {
                job: row.job.unwrap_or_default(),
                age: row.age.unwrap_or_default(),
                gender: row.gender.unwrap_or_default(),
                style,
                layout: row.layout.unwrap_or_default(),
            }
        };

        GalleryImage {
            id: row.id,
            user_id: row.user_id,
            image_url: row.image_url,
            status: row.status,
            is_public: row.is_public,
            view_count: row.view_count,
            like_count: row.like_count,
            comment_count: row.comment_count,
            created_at: row.created_at,
            username: row.username,
            avatar_url: row.avatar_url,
            details,
        }
    }
}

/// Whether a user likes an image, and how many likes it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

/// Table names and row-selection SQL for one kind.
struct KindTables {
    images: &'static str,
    comments: &'static str,
    likes: &'static str,
    views: &'static str,
    /// Yields `GalleryRow` columns; callers append WHERE clauses on alias `i`.
    select: &'static str,
}

const AVATAR_TABLES: KindTables = KindTables {
    images: "generated_images",
    comments: "image_comments",
    likes: "image_likes",
    views: "image_views",
    select: r#"
        SELECT i.id, i.user_id, 'avatar' AS kind, i.image_url AS image_url, i.status,
               i.is_public, i.view_count,
               (SELECT COUNT(*) FROM image_likes l WHERE l.image_id = i.id) AS like_count,
               (SELECT COUNT(*) FROM image_comments c WHERE c.image_id = i.id) AS comment_count,
               i.created_at, p.username, p.avatar_url,
               i.job, i.age, i.gender, i.style, i.layout, NULL AS original_url
        FROM generated_images i
        LEFT JOIN profiles p ON p.id = i.user_id
    "#,
};

const DOODLE_TABLES: KindTables = KindTables {
    images: "doodle_images",
    comments: "doodle_comments",
    likes: "doodle_likes",
    views: "doodle_views",
    select: r#"
        SELECT i.id, i.user_id, 'doodle' AS kind, i.result_url AS image_url, i.status,
               i.is_public, i.view_count,
               (SELECT COUNT(*) FROM doodle_likes l WHERE l.image_id = i.id) AS like_count,
               (SELECT COUNT(*) FROM doodle_comments c WHERE c.image_id = i.id) AS comment_count,
               i.created_at, p.username, p.avatar_url,
               NULL AS job, NULL AS age, NULL AS gender, i.style, NULL AS layout,
               i.original_url AS original_url
        FROM doodle_images i
        LEFT JOIN profiles p ON p.id = i.user_id
    "#,
};

/// Gallery operations for one image kind.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    fn kind(&self) -> ImageKind;

    /// Get one image regardless of visibility.
    async fn fetch_by_id(&self, pool: &SqlitePool, id: &str) -> Result<GalleryImage>;

    /// Public, completed images.
    async fn list_public(
        &self,
        pool: &SqlitePool,
        sort: GallerySort,
        page: Page,
    ) -> Result<Vec<GalleryImage>>;

    /// Every image owned by a user, newest first.
    async fn list_for_user(&self, pool: &SqlitePool, user_id: &str) -> Result<Vec<GalleryImage>>;

    async fn add_comment(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<Comment>;

    /// Delete a comment written by `user_id`.
    async fn delete_comment(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        comment_id: &str,
        user_id: &str,
    ) -> Result<()>;

    /// Comments on an image, oldest first.
    async fn list_comments(&self, pool: &SqlitePool, image_id: &str) -> Result<Vec<Comment>>;

    async fn add_like(&self, pool: &SqlitePool, image_id: &str, user_id: &str)
        -> Result<LikeState>;

    async fn remove_like(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        user_id: &str,
    ) -> Result<LikeState>;

    async fn like_state(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        user_id: Option<&str>,
    ) -> Result<LikeState>;

    /// Count a view. Known viewers are counted once per image, anonymous
    /// views always. Returns the view count afterwards.
    async fn record_view(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<i64>;

    /// Flip `is_public` on an image owned by `user_id`; returns the new value.
    async fn toggle_visibility(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        user_id: &str,
    ) -> Result<bool>;
}

/// Repository backed by one kind's tables.
pub struct KindRepository {
    kind: ImageKind,
}

static AVATAR_REPOSITORY: KindRepository = KindRepository {
    kind: ImageKind::Avatar,
};

static DOODLE_REPOSITORY: KindRepository = KindRepository {
    kind: ImageKind::Doodle,
};

impl KindRepository {
    fn tables(&self) -> &'static KindTables {
        self.kind.tables()
    }

    async fn ensure_exists(&self, pool: &SqlitePool, image_id: &str) -> Result<()> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE id = ?", self.tables().images);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(image_id)
            .fetch_one(pool)
            .await?;

        if count == 0 {
            return Err(DatabaseError::NotFound {
                entity: "Image",
                id: image_id.to_string(),
            });
        }
        Ok(())
    }

    async fn fetch_comment(&self, pool: &SqlitePool, comment_id: &str) -> Result<Comment> {
        let sql = format!(
            r#"
            SELECT c.id, c.image_id, c.user_id, c.content, c.created_at, p.username, p.avatar_url
            FROM {} c
            LEFT JOIN profiles p ON p.id = c.user_id
            WHERE c.id = ?
            "#,
            self.tables().comments
        );

        sqlx::query_as::<_, Comment>(&sql)
            .bind(comment_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "Comment",
                id: comment_id.to_string(),
            })
    }
}

#[async_trait]
impl ImageRepository for KindRepository {
    fn kind(&self) -> ImageKind {
        self.kind
    }

    async fn fetch_by_id(&self, pool: &SqlitePool, id: &str) -> Result<GalleryImage> {
        let sql = format!("{} WHERE i.id = ?", self.tables().select);
        let row = sqlx::query_as::<_, GalleryRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "Image",
                id: id.to_string(),
            })?;

        Ok(row.into())
    }

    async fn list_public(
        &self,
        pool: &SqlitePool,
        sort: GallerySort,
        page: Page,
    ) -> Result<Vec<GalleryImage>> {
        list_public_feed(pool, &[self.kind], sort, page).await
    }

    async fn list_for_user(&self, pool: &SqlitePool, user_id: &str) -> Result<Vec<GalleryImage>> {
        let sql = format!(
            "{} WHERE i.user_id = ? ORDER BY i.created_at DESC, i.id DESC",
            self.tables().select
        );
        let rows = sqlx::query_as::<_, GalleryRow>(&sql)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(GalleryImage::from).collect())
    }

    async fn add_comment(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<Comment> {
        self.ensure_exists(pool, image_id).await?;

        let id = Uuid::new_v4().to_string();
        let sql = format!(
            "INSERT INTO {} (id, image_id, user_id, content) VALUES (?, ?, ?, ?)",
            self.tables().comments
        );
        sqlx::query(&sql)
            .bind(&id)
            .bind(image_id)
            .bind(user_id)
            .bind(content.trim())
            .execute(pool)
            .await?;

        tracing::debug!(kind = %self.kind, image_id, user_id, comment_id = %id, "Comment added");
        self.fetch_comment(pool, &id).await
    }

    async fn delete_comment(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        comment_id: &str,
        user_id: &str,
    ) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE id = ? AND image_id = ? AND user_id = ?",
            self.tables().comments
        );
        let result = sqlx::query(&sql)
            .bind(comment_id)
            .bind(image_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound {
                entity: "Comment",
                id: comment_id.to_string(),
            });
        }
        Ok(())
    }

    async fn list_comments(&self, pool: &SqlitePool, image_id: &str) -> Result<Vec<Comment>> {
        let sql = format!(
            r#"
            SELECT c.id, c.image_id, c.user_id, c.content, c.created_at, p.username, p.avatar_url
            FROM {} c
            LEFT JOIN profiles p ON p.id = c.user_id
            WHERE c.image_id = ?
            ORDER BY c.created_at, c.rowid
            "#,
            self.tables().comments
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(image_id)
            .fetch_all(pool)
            .await?;

        Ok(comments)
    }

    async fn add_like(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        user_id: &str,
    ) -> Result<LikeState> {
        self.ensure_exists(pool, image_id).await?;

        let sql = format!(
            "INSERT OR IGNORE INTO {} (image_id, user_id) VALUES (?, ?)",
            self.tables().likes
        );
        sqlx::query(&sql)
            .bind(image_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        self.like_state(pool, image_id, Some(user_id)).await
    }

    async fn remove_like(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        user_id: &str,
    ) -> Result<LikeState> {
        self.ensure_exists(pool, image_id).await?;

        let sql = format!(
            "DELETE FROM {} WHERE image_id = ? AND user_id = ?",
            self.tables().likes
        );
        sqlx::query(&sql)
            .bind(image_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        self.like_state(pool, image_id, Some(user_id)).await
    }

    async fn like_state(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        user_id: Option<&str>,
    ) -> Result<LikeState> {
        let sql = format!(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN user_id = ? THEN 1 ELSE 0 END), 0)
            FROM {}
            WHERE image_id = ?
            "#,
            self.tables().likes
        );
        let (like_count, mine) = sqlx::query_as::<_, (i64, i64)>(&sql)
            .bind(user_id)
            .bind(image_id)
            .fetch_one(pool)
            .await?;

        Ok(LikeState {
            liked: mine > 0,
            like_count,
        })
    }

    async fn record_view(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<i64> {
        let tables = self.tables();
        let mut tx = pool.begin().await?;

        let first_view = match viewer_id {
            Some(viewer) => {
                let sql = format!(
                    "INSERT OR IGNORE INTO {} (image_id, viewer_id) SELECT id, ? FROM {} WHERE id = ?",
                    tables.views, tables.images
                );
                sqlx::query(&sql)
                    .bind(viewer)
                    .bind(image_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected()
                    > 0
            }
            None => true,
        };

        if first_view {
            let sql = format!(
                "UPDATE {} SET view_count = view_count + 1 WHERE id = ?",
                tables.images
            );
            sqlx::query(&sql).bind(image_id).execute(&mut *tx).await?;
        }

        let sql = format!("SELECT view_count FROM {} WHERE id = ?", tables.images);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(image_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "Image",
                id: image_id.to_string(),
            })?;

        tx.commit().await?;
        Ok(count)
    }

    async fn toggle_visibility(
        &self,
        pool: &SqlitePool,
        image_id: &str,
        user_id: &str,
    ) -> Result<bool> {
        let images = self.tables().images;
        let sql = format!(
            r#"
            UPDATE {images}
            SET is_public = NOT is_public, updated_at = datetime('now')
            WHERE id = ? AND user_id = ? AND (is_public = 1 OR status = 'completed')
            "#
        );
        let updated = sqlx::query(&sql)
            .bind(image_id)
            .bind(user_id)
            .execute(pool)
            .await?
            .rows_affected();

        let sql = format!("SELECT user_id, is_public FROM {images} WHERE id = ?");
        let row = sqlx::query_as::<_, (String, bool)>(&sql)
            .bind(image_id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some((owner, is_public)) if owner == user_id => {
                if updated == 0 {
                    return Err(DatabaseError::InvalidState {
                        entity: "Image",
                        id: image_id.to_string(),
                        reason: "only completed images can be public",
                    });
                }
                tracing::info!(kind = %self.kind, image_id, is_public, "Visibility changed");
                Ok(is_public)
            }
            // Someone else's image looks the same as a missing one.
            _ => Err(DatabaseError::NotFound {
                entity: "Image",
                id: image_id.to_string(),
            }),
        }
    }
}

/// Public, completed images across the given kinds.
pub async fn list_public_feed(
    pool: &SqlitePool,
    kinds: &[ImageKind],
    sort: GallerySort,
    page: Page,
) -> Result<Vec<GalleryImage>> {
    if kinds.is_empty() {
        return Ok(Vec::new());
    }

    let unions = kinds
        .iter()
        .map(|kind| {
            format!(
                "{} WHERE i.is_public = 1 AND i.status = 'completed'",
                kind.tables().select
            )
        })
        .collect::<Vec<_>>()
        .join(" UNION ALL ");

    let sql = format!(
        "SELECT * FROM ({unions}) ORDER BY {} LIMIT ? OFFSET ?",
        sort.order_by()
    );

    let rows = sqlx::query_as::<_, GalleryRow>(&sql)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(GalleryImage::from).collect())
}
