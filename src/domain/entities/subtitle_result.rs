//! A candidate subtitle returned by a provider search.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtitleFormat {
    Ass,
    Ssa,
    Srt,
    Vtt,
    Unknown,
}

/// Closed match-kind vocabulary a provider may tag a result with,
/// consumed by the scoring table in [`crate::domain::entities::scoring`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    Hash,
    Series,
    Title,
    Year,
    Season,
    Episode,
    ReleaseGroup,
    Source,
    AudioCodec,
    Resolution,
    HearingImpaired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleResult {
    pub provider_name: String,
    pub subtitle_id: String,
    pub language: String,
    pub format: SubtitleFormat,
    pub filename: String,
    pub download_url: String,
    /// Present once `download` succeeds.
    pub content: Option<Vec<u8>>,
    pub release_info: Option<String>,
    pub hearing_impaired: bool,
    pub forced: bool,
    pub fps: Option<f32>,
    /// Uploader-trust bonus, 0-20, pre-filled by the provider.
    pub uploader_trust_bonus: i32,
    pub matches: HashSet<MatchKind>,
    /// Computed by the provider manager; never set by the provider itself.
    pub score: i32,
    pub machine_translated: bool,
    pub machine_translation_confidence: Option<f32>,
}

impl SubtitleResult {
    pub fn new(provider_name: impl Into<String>, subtitle_id: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            provider_name: provider_name.into(),
            subtitle_id: subtitle_id.into(),
            language: language.into(),
            format: SubtitleFormat::Unknown,
            filename: String::new(),
            download_url: String::new(),
            content: None,
            release_info: None,
            hearing_impaired: false,
            forced: false,
            fps: None,
            uploader_trust_bonus: 0,
            matches: HashSet::new(),
            score: 0,
            machine_translated: false,
            machine_translation_confidence: None,
        }
    }
}
