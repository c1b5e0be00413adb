//! Cleanup task: always expires zombie jobs and prunes terminal
//! jobs past retention (mirroring the job queue's own housekeeping
//! loop, which runs independently at a 60s cadence for in-memory
//! state), plus every enabled cleanup rule over persisted state --
//! currently just provider-cache TTL expiry.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::repositories::{JobRepository, ProviderCacheRepository};
use crate::shared::error::SchedulerError;

use super::periodic_task::ScheduledTask;

const JOB_RETENTION_DAYS: i64 = 7;

pub struct CleanupTask {
    pub job_repository: Arc<dyn JobRepository>,
    pub provider_cache_repository: Arc<dyn ProviderCacheRepository>,
}

#[async_trait]
impl ScheduledTask for CleanupTask {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn default_interval_hours(&self) -> u64 {
        168
    }

    async fn run(&self) -> Result<(), SchedulerError> {
        let now = chrono::Utc::now();
        let cutoff = now - chrono::Duration::days(JOB_RETENTION_DAYS);

        let jobs_pruned = self
            .job_repository
            .delete_older_than(cutoff)
            .await
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;

        let cache_pruned = self
            .provider_cache_repository
            .purge_expired(now)
            .await
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;

        info!(jobs_pruned, cache_pruned, "scheduled cleanup complete");
        Ok(())
    }
}
