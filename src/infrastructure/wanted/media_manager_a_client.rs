//! HTTP client for media-manager A, the series-owning automation
//! system. Talks to its REST API the same way [`OllamaClient`] talks to
//! Ollama's: a base URL, an API key header, JSON in and out.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::entities::ItemType;
use crate::shared::error::WantedError;

use super::catalog_client::{CatalogClient, CatalogItem};

#[derive(Debug, Deserialize)]
struct SeriesWantedEntry {
    series_id: String,
    episode_id: String,
    series_title: String,
    year: Option<u16>,
    season_number: u32,
    episode_number: u32,
    path: String,
    missing_languages: Vec<String>,
    #[serde(default)]
    anime: bool,
    tvdb_id: Option<u32>,
}

pub struct MediaManagerAClient {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl MediaManagerAClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http_client: reqwest::Client::new(),
            timeout,
        }
    }

    fn to_catalog_item(entry: SeriesWantedEntry) -> CatalogItem {
        CatalogItem {
            item_type: ItemType::Episode,
            external_id: entry.episode_id,
            title: entry.series_title,
            year: entry.year,
            season: Some(entry.season_number),
            episode: Some(entry.episode_number),
            video_path: entry.path,
            missing_languages: entry.missing_languages,
            is_anime: entry.anime,
            tvdb_id: entry.tvdb_id,
        }
    }
}

#[async_trait]
impl CatalogClient for MediaManagerAClient {
    fn name(&self) -> &'static str {
        "media_manager_a"
    }

    async fn list_wanted(&self) -> Result<Vec<CatalogItem>, WantedError> {
        let url = format!("{}/api/v3/wanted/missingsubtitles", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WantedError::CatalogError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WantedError::CatalogError(format!("media-manager A returned {}", response.status())));
        }

        let entries: Vec<SeriesWantedEntry> =
            response.json().await.map_err(|e| WantedError::CatalogError(e.to_string()))?;
        Ok(entries.into_iter().map(Self::to_catalog_item).collect())
    }

    async fn item_metadata(&self, external_id: &str) -> Result<CatalogItem, WantedError> {
        let url = format!("{}/api/v3/episode/{}", self.base_url, external_id);
        let response = self
            .http_client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WantedError::CatalogError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WantedError::CatalogError(format!("media-manager A returned {}", response.status())));
        }

        let entry: SeriesWantedEntry = response.json().await.map_err(|e| WantedError::CatalogError(e.to_string()))?;
        Ok(Self::to_catalog_item(entry))
    }
}
