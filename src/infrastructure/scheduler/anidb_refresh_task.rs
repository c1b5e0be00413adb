//! AniDB mapping refresh task: downloads the (tvdb_id, season,
//! tvdb_episode) -> absolute_anidb_episode mapping file and upserts it
//! into the AniDB repository.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::domain::entities::AnidbMapping;
use crate::domain::repositories::AnidbRepository;
use crate::shared::error::SchedulerError;

use super::periodic_task::ScheduledTask;

#[derive(Debug, Deserialize)]
struct AnimeLists {
    #[serde(rename = "anime", default)]
    entries: Vec<AnimeEntry>,
}

#[derive(Debug, Deserialize)]
struct AnimeEntry {
    #[serde(rename = "@anidbid")]
    anidb_id: u32,
    #[serde(rename = "@tvdbid")]
    tvdb_id: Option<String>,
    #[serde(rename = "@defaulttvdbseason")]
    default_season: Option<String>,
}

pub struct AnidbRefreshTask {
    pub mapping_url: String,
    pub http_client: reqwest::Client,
    pub anidb_repository: Arc<dyn AnidbRepository>,
}

#[async_trait]
impl ScheduledTask for AnidbRefreshTask {
    fn name(&self) -> &'static str {
        "anidb_refresh"
    }

    fn default_interval_hours(&self) -> u64 {
        168
    }

    async fn run(&self) -> Result<(), SchedulerError> {
        let response = self
            .http_client
            .get(&self.mapping_url)
            .timeout(Duration::from_secs(120))
            .send()
            .await
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;

        let body = response.text().await.map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;
        let parsed: AnimeLists = quick_xml::de::from_str(&body).map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;

        let mut upserted = 0u32;
        for entry in parsed.entries {
            let Some(tvdb_id) = entry.tvdb_id else { continue };
            let season_offset = entry
                .default_season
                .and_then(|s| s.parse::<i32>().ok())
                .unwrap_or(0);

            let mapping = AnidbMapping {
                anidb_id: entry.anidb_id,
                catalog_series_id: tvdb_id,
                season_offset,
                refreshed_at: chrono::Utc::now(),
            };

            self.anidb_repository
                .upsert(&mapping)
                .await
                .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;
            upserted += 1;
        }

        info!(upserted, "scheduled AniDB mapping refresh complete");
        Ok(())
    }
}
