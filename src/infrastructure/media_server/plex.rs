//! Plex backend. Plex has no direct path-to-item search endpoint
//! in its public API surface, so item-level refresh always falls back
//! to a full library scan per section.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::entities::ItemType;
use crate::shared::error::MediaServerError;

use super::backend_trait::MediaServerBackend;

#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    #[serde(rename = "MediaContainer")]
    media_container: MediaContainer,
}

#[derive(Debug, Deserialize)]
struct MediaContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<Directory>,
}

#[derive(Debug, Deserialize)]
struct Directory {
    key: String,
}

pub struct PlexBackend {
    base_url: String,
    token: String,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl PlexBackend {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http_client: reqwest::Client::new(),
            timeout,
        }
    }

    async fn section_keys(&self) -> Result<Vec<String>, MediaServerError> {
        let url = format!("{}/library/sections", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("X-Plex-Token", &self.token)
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MediaServerError::Http(format!("Plex /library/sections returned {}", response.status())));
        }

        let body: DirectoryResponse = response.json().await.map_err(|e| MediaServerError::Http(e.to_string()))?;
        Ok(body.media_container.directories.into_iter().map(|d| d.key).collect())
    }
}

#[async_trait]
impl MediaServerBackend for PlexBackend {
    fn name(&self) -> &'static str {
        "plex"
    }

    async fn health_check(&self) -> Result<(), MediaServerError> {
        let url = format!("{}/identity", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("X-Plex-Token", &self.token)
            .timeout(Duration::from_secs(5))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(MediaServerError::Http(format!("Plex identity check returned {}", response.status())))
        }
    }

    /// Plex cannot resolve an arbitrary path to an item without a
    /// section-scoped browse, so every item refresh becomes a
    /// library-wide scan of all sections.
    async fn refresh_item(&self, _file_path: &str, _item_type: ItemType) -> Result<(), MediaServerError> {
        self.refresh_library().await
    }

    async fn refresh_library(&self) -> Result<(), MediaServerError> {
        let keys = self.section_keys().await?;
        if keys.is_empty() {
            return Err(MediaServerError::ItemNotFound("no Plex library sections configured".to_string()));
        }

        for key in keys {
            let url = format!("{}/library/sections/{}/refresh", self.base_url, key);
            let response = self
                .http_client
                .get(&url)
                .header("X-Plex-Token", &self.token)
                .timeout(self.timeout)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(MediaServerError::Http(format!("Plex section {} refresh returned {}", key, response.status())));
            }
        }
        Ok(())
    }
}
