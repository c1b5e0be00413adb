use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::entities::WantedStatus;
use crate::domain::repositories::WantedRepository;
use crate::infrastructure::wanted::SearchLoop;
use crate::shared::error::SchedulerError;

use super::periodic_task::ScheduledTask;

const MAX_ITEMS_PER_RUN: usize = 200;

pub struct WantedSearchTask {
    pub search_loop: Arc<SearchLoop>,
    pub wanted_repository: Arc<dyn WantedRepository>,
}

#[async_trait]
impl ScheduledTask for WantedSearchTask {
    fn name(&self) -> &'static str {
        "wanted_search"
    }

    fn default_interval_hours(&self) -> u64 {
        24
    }

    async fn run(&self) -> Result<(), SchedulerError> {
        let pending = self
            .wanted_repository
            .list_by_status(WantedStatus::Pending)
            .await
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;

        let results = self.search_loop.run_batch(pending, MAX_ITEMS_PER_RUN).await;
        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        info!(attempted = results.len(), succeeded, "scheduled wanted search complete");
        Ok(())
    }
}
