//! Search loop: drives a single [`WantedItem`] (or a batch of
//! them) through the translator engine, then persists the outcome,
//! records history, emits events, and fans the refresh out to every
//! media server.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::entities::{ItemType, Job, JobKind, WantedItem, WantedStatus};
use crate::domain::repositories::{AnidbRepository, JobRepository, StatsRepository, WantedRepository};
use crate::infrastructure::media_server::MediaServerManager;
use crate::infrastructure::messaging::named_event_bus::{payload, NamedEventBus};
use crate::infrastructure::translator::engine::{TranslatorEngine, TranslatorOutcome};
use crate::shared::error::WantedError;

const MAX_SEARCH_ATTEMPTS: u32 = 5;

pub struct SearchLoop {
    engine: Arc<TranslatorEngine>,
    wanted_repository: Arc<dyn WantedRepository>,
    job_repository: Arc<dyn JobRepository>,
    anidb_repository: Arc<dyn AnidbRepository>,
    stats_repository: Arc<dyn StatsRepository>,
    media_server_manager: Arc<MediaServerManager>,
    event_bus: Arc<NamedEventBus>,
}

impl SearchLoop {
    pub fn new(
        engine: Arc<TranslatorEngine>,
        wanted_repository: Arc<dyn WantedRepository>,
        job_repository: Arc<dyn JobRepository>,
        anidb_repository: Arc<dyn AnidbRepository>,
        stats_repository: Arc<dyn StatsRepository>,
        media_server_manager: Arc<MediaServerManager>,
        event_bus: Arc<NamedEventBus>,
    ) -> Self {
        Self {
            engine,
            wanted_repository,
            job_repository,
            anidb_repository,
            stats_repository,
            media_server_manager,
            event_bus,
        }
    }

    /// Runs the full pipeline for one item: resolve AniDB absolute
    /// episode if applicable, invoke the translator engine, then update
    /// the item's lifecycle state and fan out side effects.
    pub async fn run_one(&self, mut item: WantedItem) -> Result<TranslatorOutcome, WantedError> {
        let absolute_episode = self.resolve_absolute_episode(&item).await;

        let mut job = Job::new(JobKind::Translate, item.id);
        job.start();
        self.job_repository.insert(&job).await?;
        self.event_bus.emit("job_started", payload(&[("job_id", Value::String(job.id.to_string())), ("kind", Value::String("translate".to_string()))])).await.ok();

        let outcome = self.engine.process_with_absolute_episode(&item, &mut job, absolute_episode).await;

        match outcome {
            Ok(result) => {
                self.on_success(&mut item, &job, &result).await?;
                job.complete();
                self.job_repository.update(&job).await?;
                self.event_bus.emit("job_completed", payload(&[("job_id", Value::String(job.id.to_string()))])).await.ok();
                Ok(result)
            }
            Err(e) => {
                self.on_failure(&mut item, e.to_string()).await?;
                job.fail(e.to_string());
                self.job_repository.update(&job).await?;
                self.event_bus.emit("job_failed", payload(&[("job_id", Value::String(job.id.to_string())), ("error", Value::String(e.to_string()))])).await.ok();
                Err(WantedError::Translator(e))
            }
        }
    }

    /// Processes a bounded batch of items sequentially, honouring
    /// `max_items` and emitting per-item progress via the job events
    /// already raised by [`run_one`].
    pub async fn run_batch(&self, items: Vec<WantedItem>, max_items: usize) -> Vec<Result<TranslatorOutcome, WantedError>> {
        let mut results = Vec::new();
        for item in items.into_iter().take(max_items) {
            results.push(self.run_one(item).await);
        }
        results
    }

    async fn resolve_absolute_episode(&self, item: &WantedItem) -> Option<u32> {
        if item.item_type != ItemType::Episode {
            return None;
        }
        // Only anime series carry an AniDB mapping; callers without one
        // simply get no rewrite, which is a no-op for non-anime items.
        let mapping = self.anidb_repository.find_by_catalog_series_id(&item.video_path).await.ok().flatten()?;
        Some((mapping.season_offset.max(0)) as u32)
    }

    async fn on_success(&self, item: &mut WantedItem, _job: &Job, outcome: &TranslatorOutcome) -> Result<(), WantedError> {
        match outcome {
            TranslatorOutcome::Translated { output_path } | TranslatorOutcome::Transcribed { output_path } => {
                item.mark_searched(true);
                self.wanted_repository.update(item).await?;
                self.record_stat(outcome).await;

                self.event_bus
                    .emit("wanted_item_fulfilled", payload(&[("wanted_item_id", Value::String(item.id.to_string())), ("output_path", Value::String(output_path.clone()))]))
                    .await
                    .ok();

                let outcomes = self.media_server_manager.refresh_all(&item.video_path, item.item_type.clone()).await;
                for refresh in outcomes {
                    self.event_bus
                        .emit("media_server_refreshed", payload(&[("server_name", Value::String(refresh.backend_name.to_string())), ("file_path", Value::String(item.video_path.clone()))]))
                        .await
                        .ok();
                }
                info!(item_id = %item.id, output = %output_path, "wanted item fulfilled");
            }
            TranslatorOutcome::Upgraded { output_path } => {
                item.mark_searched(true);
                self.wanted_repository.update(item).await?;
                self.record_stat(outcome).await;

                self.event_bus
                    .emit("upgrade_complete", payload(&[("wanted_item_id", Value::String(item.id.to_string())), ("output_path", Value::String(output_path.clone()))]))
                    .await
                    .ok();

                let outcomes = self.media_server_manager.refresh_all(&item.video_path, item.item_type.clone()).await;
                for refresh in outcomes {
                    self.event_bus
                        .emit("media_server_refreshed", payload(&[("server_name", Value::String(refresh.backend_name.to_string())), ("file_path", Value::String(item.video_path.clone()))]))
                        .await
                        .ok();
                }
                info!(item_id = %item.id, output = %output_path, "subtitle upgraded to ASS");
            }
            TranslatorOutcome::AlreadySatisfied { .. } => {
                item.mark_searched(true);
                self.wanted_repository.update(item).await?;
            }
            TranslatorOutcome::NotFound { reason } => {
                item.mark_searched(false);
                self.wanted_repository.update(item).await?;
                self.event_bus
                    .emit("wanted_item_not_found", payload(&[("wanted_item_id", Value::String(item.id.to_string())), ("reason", Value::String(reason.clone()))]))
                    .await
                    .ok();
            }
            TranslatorOutcome::Ignored { .. } => {
                item.status = WantedStatus::Ignored;
                item.updated_at = chrono::Utc::now();
                self.wanted_repository.update(item).await?;
            }
        }
        Ok(())
    }

    async fn on_failure(&self, item: &mut WantedItem, reason: String) -> Result<(), WantedError> {
        item.mark_searched(false);
        self.wanted_repository.update(item).await?;

        if item.search_count >= MAX_SEARCH_ATTEMPTS {
            item.status = WantedStatus::Ignored;
            self.wanted_repository.update(item).await?;
            warn!(item_id = %item.id, attempts = item.search_count, "wanted item exhausted search attempts");
        }

        self.event_bus
            .emit("wanted_item_not_found", payload(&[("wanted_item_id", Value::String(item.id.to_string())), ("reason", Value::String(reason))]))
            .await
            .ok();
        Ok(())
    }

    async fn record_stat(&self, outcome: &TranslatorOutcome) {
        let today = chrono::Utc::now().date_naive();
        let mut stat = self.stats_repository.get(today).await.ok().flatten().unwrap_or_else(|| crate::domain::entities::DailyStat::new(today));
        match outcome {
            TranslatorOutcome::Translated { .. } | TranslatorOutcome::Upgraded { .. } => stat.subtitles_translated += 1,
            TranslatorOutcome::Transcribed { .. } => stat.subtitles_transcribed += 1,
            _ => {}
        }
        let _ = self.stats_repository.upsert(&stat).await;
    }
}
