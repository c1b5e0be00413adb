//! A provider that searches by title/year/season/episode metadata
//! rather than file hash -- the fallback most providers support when no
//! hash match exists. Modeled on a typical subtitle-site search API:
//! free-text title plus structured filters, returning release-tagged
//! hits the manager scores against the match-kind table.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::entities::{ItemType, MatchKind, SubtitleFormat, SubtitleResult, VideoQuery};
use crate::shared::error::ProviderError;

use super::http_session::HttpSession;
use super::provider_trait::{ProviderConfigField, RateLimit, SubtitleProvider};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: String,
    language: String,
    release: String,
    download_url: String,
    format: String,
    hearing_impaired: bool,
    forced: bool,
    uploader_trust: Option<i32>,
}

pub struct MetadataSearchProvider {
    base_url: String,
    api_key: String,
}

impl MetadataSearchProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), api_key: api_key.to_string() }
    }
}

#[async_trait]
impl SubtitleProvider for MetadataSearchProvider {
    fn name(&self) -> &'static str {
        "metadata_search"
    }

    fn supported_languages(&self) -> &'static [&'static str] {
        &["en", "de", "hu", "fr", "es", "it", "pt", "nl", "pl", "ru", "ja", "ko", "zh"]
    }

    fn config_fields(&self) -> Vec<ProviderConfigField> {
        vec![
            ProviderConfigField { key: "base_url", label: "API base URL", required: true },
            ProviderConfigField { key: "api_key", label: "API key", required: true },
        ]
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit { requests: 20, per_seconds: 10 }
    }

    async fn initialize(&self, _session: &HttpSession) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn search(&self, session: &HttpSession, query: &VideoQuery) -> Result<Vec<SubtitleResult>, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let mut params = vec![("title", query.title.clone()), ("language", query.wanted_language.clone())];
        if let Some(year) = query.year {
            params.push(("year", year.to_string()));
        }
        if let Some(season) = query.season {
            params.push(("season", season.to_string()));
        }
        if let Some(episode) = query.episode {
            params.push(("episode", episode.to_string()));
        }
        let api_key = self.api_key.clone();

        let response = session.execute(|| session.client().get(&url).query(&params).bearer_auth(&api_key)).await?;
        let parsed: SearchResponse = response.json().await.map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|hit| {
                let mut result = SubtitleResult::new(self.name(), hit.id, hit.language);
                result.matches = derive_matches(query, &hit.release);
                result.release_info = Some(hit.release);
                result.download_url = hit.download_url;
                result.hearing_impaired = hit.hearing_impaired;
                result.forced = hit.forced;
                result.format = parse_format(&hit.format);
                result.uploader_trust_bonus = hit.uploader_trust.unwrap_or(0).clamp(0, 20);
                result
            })
            .collect())
    }

    async fn download(&self, session: &HttpSession, result: &SubtitleResult) -> Result<Vec<u8>, ProviderError> {
        let response = session.execute(|| session.client().get(&result.download_url).bearer_auth(&self.api_key)).await?;
        Ok(response.bytes().await.map_err(|e| ProviderError::Http(e.to_string()))?.to_vec())
    }

    async fn health_check(&self, session: &HttpSession) -> (bool, String) {
        match session.client().get(format!("{}/health", self.base_url)).send().await {
            Ok(resp) if resp.status().is_success() => (true, "ok".to_string()),
            Ok(resp) => (false, format!("status {}", resp.status())),
            Err(e) => (false, e.to_string()),
        }
    }
}

/// Matches the release string against the query's own metadata fields
/// to derive which match kinds apply, since this provider has no
/// per-field structured response -- only a free-text release tag.
fn derive_matches(query: &VideoQuery, release: &str) -> HashSet<MatchKind> {
    let lower = release.to_ascii_lowercase();
    let mut matches = HashSet::new();

    match query.item_type {
        ItemType::Episode => {
            if lower.contains(&query.title.to_ascii_lowercase()) {
                matches.insert(MatchKind::Series);
            }
            if let Some(season) = query.season {
                if lower.contains(&format!("s{:02}", season)) {
                    matches.insert(MatchKind::Season);
                }
            }
            if let Some(episode) = query.episode {
                if lower.contains(&format!("e{:02}", episode)) {
                    matches.insert(MatchKind::Episode);
                }
            }
        }
        ItemType::Movie => {
            if lower.contains(&query.title.to_ascii_lowercase()) {
                matches.insert(MatchKind::Title);
            }
        }
    }

    if let Some(year) = query.year {
        if lower.contains(&year.to_string()) {
            matches.insert(MatchKind::Year);
        }
    }
    if let Some(group) = &query.release_group {
        if lower.contains(&group.to_ascii_lowercase()) {
            matches.insert(MatchKind::ReleaseGroup);
        }
    }
    if let Some(source) = &query.source {
        if lower.contains(&source.to_ascii_lowercase()) {
            matches.insert(MatchKind::Source);
        }
    }
    if let Some(codec) = &query.codec {
        if lower.contains(&codec.to_ascii_lowercase()) {
            matches.insert(MatchKind::AudioCodec);
        }
    }
    if let Some(resolution) = &query.resolution {
        if lower.contains(&resolution.to_ascii_lowercase()) {
            matches.insert(MatchKind::Resolution);
        }
    }

    matches
}

fn parse_format(raw: &str) -> SubtitleFormat {
    match raw.to_ascii_lowercase().as_str() {
        "ass" => SubtitleFormat::Ass,
        "ssa" => SubtitleFormat::Ssa,
        "srt" => SubtitleFormat::Srt,
        "vtt" => SubtitleFormat::Vtt,
        _ => SubtitleFormat::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode_query() -> VideoQuery {
        VideoQuery {
            item_type: ItemType::Episode,
            title: "Example Show".to_string(),
            year: Some(2020),
            season: Some(1),
            episode: Some(3),
            release_group: Some("GRP".to_string()),
            source: Some("WEB-DL".to_string()),
            resolution: Some("1080p".to_string()),
            codec: Some("x264".to_string()),
            file_name: "example.show.s01e03.1080p.web-dl.x264-grp.mkv".to_string(),
            wanted_language: "hu".to_string(),
        }
    }

    #[test]
    fn derives_series_season_episode_and_year_matches() {
        let query = episode_query();
        let matches = derive_matches(&query, "Example.Show.S01E03.2020.1080p.WEB-DL.x264-GRP");
        assert!(matches.contains(&MatchKind::Series));
        assert!(matches.contains(&MatchKind::Season));
        assert!(matches.contains(&MatchKind::Episode));
        assert!(matches.contains(&MatchKind::Year));
        assert!(matches.contains(&MatchKind::ReleaseGroup));
    }

    #[test]
    fn movie_query_derives_title_match_not_series() {
        let mut query = episode_query();
        query.item_type = ItemType::Movie;
        let matches = derive_matches(&query, "Example.Show.2020.1080p");
        assert!(matches.contains(&MatchKind::Title));
        assert!(!matches.contains(&MatchKind::Series));
    }
}
