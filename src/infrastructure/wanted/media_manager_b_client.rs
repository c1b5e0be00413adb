//! HTTP client for media-manager B, the movie-owning automation system.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::entities::ItemType;
use crate::shared::error::WantedError;

use super::catalog_client::{CatalogClient, CatalogItem};

#[derive(Debug, Deserialize)]
struct MovieWantedEntry {
    movie_id: String,
    title: String,
    year: Option<u16>,
    path: String,
    missing_languages: Vec<String>,
}

pub struct MediaManagerBClient {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl MediaManagerBClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http_client: reqwest::Client::new(),
            timeout,
        }
    }

    fn to_catalog_item(entry: MovieWantedEntry) -> CatalogItem {
        CatalogItem {
            item_type: ItemType::Movie,
            external_id: entry.movie_id,
            title: entry.title,
            year: entry.year,
            season: None,
            episode: None,
            video_path: entry.path,
            missing_languages: entry.missing_languages,
            is_anime: false,
            tvdb_id: None,
        }
    }
}

#[async_trait]
impl CatalogClient for MediaManagerBClient {
    fn name(&self) -> &'static str {
        "media_manager_b"
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
            return Err(WantedError::CatalogError(format!("media-manager B returned {}", response.status())));
        }

        let entries: Vec<MovieWantedEntry> =
            response.json().await.map_err(|e| WantedError::CatalogError(e.to_string()))?;
        Ok(entries.into_iter().map(Self::to_catalog_item).collect())
    }

    async fn item_metadata(&self, external_id: &str) -> Result<CatalogItem, WantedError> {
        let url = format!("{}/api/v3/movie/{}", self.base_url, external_id);
        let response = self
            .http_client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WantedError::CatalogError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WantedError::CatalogError(format!("media-manager B returned {}", response.status())));
        }

        let entry: MovieWantedEntry = response.json().await.map_err(|e| WantedError::CatalogError(e.to_string()))?;
        Ok(Self::to_catalog_item(entry))
    }
}
