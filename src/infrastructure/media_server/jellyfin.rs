//! Jellyfin backend. Resolves a file path to a library item via
//! the `/Items` search endpoint, then triggers a per-item refresh; when
//! no item is found, falls back to a library-wide scan.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::entities::ItemType;
use crate::shared::error::MediaServerError;

use super::backend_trait::MediaServerBackend;

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(rename = "Items")]
    items: Vec<JellyfinItem>,
}

#[derive(Debug, Deserialize)]
struct JellyfinItem {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Path")]
    path: Option<String>,
}

pub struct JellyfinBackend {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl JellyfinBackend {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http_client: reqwest::Client::new(),
            timeout,
        }
    }

    async fn find_item_id(&self, file_path: &str) -> Result<Option<String>, MediaServerError> {
        let url = format!("{}/Items", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("X-Emby-Token", &self.api_key)
            .query(&[("recursive", "true"), ("fields", "Path")])
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MediaServerError::Http(format!("Jellyfin /Items returned {}", response.status())));
        }

        let body: ItemsResponse = response.json().await.map_err(|e| MediaServerError::Http(e.to_string()))?;
        Ok(body
            .items
            .into_iter()
            .find(|item| item.path.as_deref() == Some(file_path))
            .map(|item| item.id))
    }
}

#[async_trait]
impl MediaServerBackend for JellyfinBackend {
    fn name(&self) -> &'static str {
        "jellyfin"
    }

    async fn health_check(&self) -> Result<(), MediaServerError> {
        let url = format!("{}/System/Ping", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .header("X-Emby-Token", &self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(MediaServerError::Http(format!("Jellyfin ping returned {}", response.status())))
        }
    }

    async fn refresh_item(&self, file_path: &str, _item_type: ItemType) -> Result<(), MediaServerError> {
        let Some(item_id) = self.find_item_id(file_path).await? else {
            return self.refresh_library().await;
        };

        let url = format!("{}/Items/{}/Refresh", self.base_url, item_id);
        let response = self
            .http_client
            .post(&url)
            .header("X-Emby-Token", &self.api_key)
            .query(&[("metadataRefreshMode", "FullRefresh"), ("replaceAllMetadata", "false")])
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(MediaServerError::Http(format!("Jellyfin item refresh returned {}", response.status())))
        }
    }

    async fn refresh_library(&self) -> Result<(), MediaServerError> {
        let url = format!("{}/Library/Refresh", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("X-Emby-Token", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(MediaServerError::Http(format!("Jellyfin library refresh returned {}", response.status())))
        }
    }
}
