//! Fields extracted from a media file path, used to drive provider searches.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Episode,
    Movie,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoQuery {
    pub item_type: ItemType,
    pub title: String,
    pub year: Option<u16>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub release_group: Option<String>,
    pub source: Option<String>,
    pub resolution: Option<String>,
    pub codec: Option<String>,
    /// Original filename this query was derived from, for scoring/logging.
    pub file_name: String,
    /// Language the subtitle is wanted in.
    pub wanted_language: String,
    /// Absolute episode number, rewritten from an AniDB mapping for
    /// anime series that use absolute (rather than season-relative)
    /// episode ordering.
    pub absolute_episode: Option<u32>,
}

impl VideoQuery {
    pub fn from_parsed_media(
        parsed: &media_identifier::ParsedMedia,
        file_name: &str,
        wanted_language: &str,
    ) -> Self {
        let item_type = match parsed.media_type {
            media_identifier::MediaType::Episode => ItemType::Episode,
            _ => ItemType::Movie,
        };

        Self {
            item_type,
            title: parsed.title.clone().unwrap_or_default(),
            year: parsed.year,
            season: parsed.episode_info.season.map(|s| s as u32),
            episode: parsed.episode_info.episode.map(|e| e as u32),
            release_group: parsed.release_group.clone(),
            source: parsed.quality.source.clone(),
            resolution: parsed.quality.resolution.clone(),
            codec: parsed.quality.codec.clone(),
            file_name: file_name.to_string(),
            wanted_language: wanted_language.to_string(),
            absolute_episode: None,
        }
    }

    pub fn with_absolute_episode(mut self, absolute_episode: u32) -> Self {
        self.absolute_episode = Some(absolute_episode);
        self
    }
}
