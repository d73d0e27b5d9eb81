//! Database models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle of a generation row: `processing` then exactly one of
/// `completed` or `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum GenerationStatus {
    Processing,
    Completed,
    Error,
}

impl GenerationStatus {
    /// Wire and column representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Error => "error",
        }
    }

    /// Whether the row can no longer change.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GenerationStatus::Processing)
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(GenerationStatus::Processing),
            "completed" => Ok(GenerationStatus::Completed),
            "error" => Ok(GenerationStatus::Error),
            other => Err(format!("unknown generation status: {other}")),
        }
    }
}

/// A user profile, 1:1 with an auth user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Auth user id.
    pub id: String,
    /// Unique public handle.
    pub username: Option<String>,
    /// Display name.
    pub full_name: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A future-self portrait generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub id: String,
    pub user_id: String,
    pub job: String,
    pub age: String,
    pub gender: String,
    pub style: String,
    pub layout: String,
    /// Prompt sent to the image model.
    pub prompt: String,
    pub status: GenerationStatus,
    pub image_url: Option<String>,
    pub error_message: Option<String>,
    pub is_public: bool,
    pub view_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields needed to open a portrait generation row.
#[derive(Debug, Clone)]
pub struct NewGeneratedImage {
    pub id: String,
    pub user_id: String,
    pub job: String,
    pub age: String,
    pub gender: String,
    pub style: String,
    pub layout: String,
    pub prompt: String,
}

/// A doodle-to-reality generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DoodleImage {
    pub id: String,
    pub user_id: String,
    /// Uploaded source doodle.
    pub original_url: String,
    /// Rendered result, once completed.
    pub result_url: Option<String>,
    pub style: String,
    pub prompt: String,
    pub status: GenerationStatus,
    pub error_message: Option<String>,
    pub is_public: bool,
    pub view_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields needed to open a doodle generation row.
#[derive(Debug, Clone)]
pub struct NewDoodleImage {
    pub id: String,
    pub user_id: String,
    pub original_url: String,
    pub style: String,
    pub prompt: String,
}

/// A comment on a gallery image, joined with the author's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub image_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

/// One entry in the ticket ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TicketLedgerEntry {
    pub id: i64,
    pub user_id: String,
    /// Generation the entry belongs to, if any.
    pub job_id: Option<String>,
    /// Signed change to the balance.
    pub delta: i64,
    /// `use`, `refund` or `grant`.
    pub reason: String,
    pub created_at: String,
}
