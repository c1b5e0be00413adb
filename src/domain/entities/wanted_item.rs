//! A media file known to be missing a subtitle in a wanted language.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::video_query::ItemType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WantedStatus {
    /// Newly discovered, not yet searched.
    Pending,
    /// A search ran but found nothing acceptable.
    NotFound,
    /// Subtitle was downloaded and written to disk.
    Fulfilled,
    /// Blacklisted or otherwise permanently skipped.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtitleKind {
    /// Translated from an existing source-language subtitle or audio track.
    Translated,
    /// Transcribed directly from audio via the whisper queue.
    Transcribed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WantedItem {
    pub id: Uuid,
    pub item_type: ItemType,
    pub video_path: String,
    pub wanted_language: String,
    pub subtitle_kind: SubtitleKind,
    pub status: WantedStatus,
    pub search_count: u32,
    pub last_searched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WantedItem {
    pub fn new(
        item_type: ItemType,
        video_path: impl Into<String>,
        wanted_language: impl Into<String>,
        subtitle_kind: SubtitleKind,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            item_type,
            video_path: video_path.into(),
            wanted_language: wanted_language.into(),
            subtitle_kind,
            status: WantedStatus::Pending,
            search_count: 0,
            last_searched_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_searched(&mut self, found: bool) {
        self.search_count += 1;
        self.last_searched_at = Some(Utc::now());
        self.status = if found {
            WantedStatus::Fulfilled
        } else {
            WantedStatus::NotFound
        };
        self.updated_at = Utc::now();
    }
}
