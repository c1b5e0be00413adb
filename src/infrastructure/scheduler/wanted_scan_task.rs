use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::infrastructure::wanted::WantedScanner;
use crate::shared::error::SchedulerError;

use super::periodic_task::ScheduledTask;

pub struct WantedScanTask {
    pub scanner: Arc<WantedScanner>,
}

#[async_trait]
impl ScheduledTask for WantedScanTask {
    fn name(&self) -> &'static str {
        "wanted_scan"
    }

    fn default_interval_hours(&self) -> u64 {
        6
    }

    async fn run(&self) -> Result<(), SchedulerError> {
        let summary = self.scanner.scan().await.map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;
        info!(inserted = summary.inserted, "scheduled wanted scan complete");
        Ok(())
    }
}
