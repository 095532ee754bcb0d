use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::upload::UploadKind;

/// A video record as persisted in the `videos` table and returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub user_id: Uuid,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
}

impl Video {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Point the URL field matching `kind` at `url` and bump `updated_at`.
    pub fn set_media_url(&mut self, kind: UploadKind, url: String) {
        match kind {
            UploadKind::Thumbnail => self.thumbnail_url = Some(url),
            UploadKind::Video => self.video_url = Some(url),
        }
        self.updated_at = Utc::now();
    }
}
