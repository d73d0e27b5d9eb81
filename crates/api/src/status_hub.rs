//! In-process fan-out of generation status changes.
//!
//! Handlers publish a [`StatusUpdate`] after every status write; status
//! streams subscribe and pick out the id they follow.

use database::{
    doodle_image, generated_image, Database, DoodleImage, GeneratedImage, GenerationStatus,
    ImageKind,
};
use serde::Serialize;
use tokio::sync::broadcast;

/// Snapshot of one generation's status, as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ImageKind,
    pub status: GenerationStatus,
    pub image_url: Option<String>,
    pub error: Option<String>,
}

impl StatusUpdate {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl From<&GeneratedImage> for StatusUpdate {
    fn from(image: &GeneratedImage) -> Self {
        Self {
            id: image.id.clone(),
            kind: ImageKind::Avatar,
            status: image.status,
            image_url: image.image_url.clone(),
            error: image.error_message.clone(),
        }
    }
}

impl From<&DoodleImage> for StatusUpdate {
    fn from(doodle: &DoodleImage) -> Self {
        Self {
            id: doodle.id.clone(),
            kind: ImageKind::Doodle,
            status: doodle.status,
            image_url: doodle.result_url.clone(),
            error: doodle.error_message.clone(),
        }
    }
}

/// Read the current status of a generation row.
///
/// Returns the snapshot together with the row's owner.
pub async fn load_status(
    db: &Database,
    kind: ImageKind,
    id: &str,
) -> database::Result<(StatusUpdate, String)> {
    let pool = db.pool();
    match kind {
        ImageKind::Avatar => {
            let image = generated_image::get(pool, id).await?;
            Ok((StatusUpdate::from(&image), image.user_id))
        }
        ImageKind::Doodle => {
            let doodle = doodle_image::get(pool, id).await?;
            Ok((StatusUpdate::from(&doodle), doodle.user_id))
        }
    }
}

/// Broadcast hub for status updates.
#[derive(Debug, Clone)]
pub struct StatusHub {
    sender: broadcast::Sender<StatusUpdate>,
}

impl StatusHub {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Send an update to every current subscriber.
    pub fn publish(&self, update: StatusUpdate) {
        tracing::debug!(
            id = %update.id,
            kind = %update.kind,
            status = %update.status,
            "Publishing status update"
        );
        // No subscribers is the common case.
        let _ = self.sender.send(update);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StatusHub {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
