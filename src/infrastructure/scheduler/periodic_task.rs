//! Periodic-task skeleton shared by every interval-based scheduled job. Grounded on
//! the job queue's `housekeeping_loop`: a named `tokio::time::interval`
//! loop, except the interval is re-read from configuration on every
//! tick (so an interval change takes effect after the current cycle)
//! and an interval of zero hours disables the task entirely.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::repositories::ConfigRepository;
use crate::shared::error::SchedulerError;

#[async_trait]
pub trait ScheduledTask: Send + Sync {
    /// Stable name, used as the config key prefix (`"<name>_interval_hours"`)
    /// and for logging.
    fn name(&self) -> &'static str;

    fn default_interval_hours(&self) -> u64;

    async fn run(&self) -> Result<(), SchedulerError>;
}

pub struct PeriodicTask {
    task: Arc<dyn ScheduledTask>,
    config: Arc<dyn ConfigRepository>,
    running: AtomicBool,
}

impl PeriodicTask {
    pub fn new(task: Arc<dyn ScheduledTask>, config: Arc<dyn ConfigRepository>) -> Self {
        Self { task, config, running: AtomicBool::new(false) }
    }

    /// Idempotent: a second call while the loop is already running is
    /// a no-op.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let this = self.clone();
        tokio::spawn(async move { this.run_loop().await });
    }

    async fn run_loop(&self) {
        loop {
            let hours = self.read_interval_hours().await;
            if hours == 0 {
                info!(task = self.task.name(), "scheduled task disabled, re-checking in 1h");
                tokio::time::sleep(Duration::from_secs(3600)).await;
                continue;
            }

            tokio::time::sleep(Duration::from_secs(hours * 3600)).await;

            if let Err(e) = self.task.run().await {
                warn!(task = self.task.name(), error = %e, "scheduled task failed");
            }
        }
    }

    async fn read_interval_hours(&self) -> u64 {
        let key = format!("{}_interval_hours", self.task.name());
        match self.config.get_raw(&key).await {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| self.task.default_interval_hours()),
            _ => self.task.default_interval_hours(),
        }
    }
}
