//! Database backup task: a full SQLite online backup daily at
//! 03:00 UTC, rotated daily/weekly/monthly. Runs on its own cron
//! schedule rather than the hours-interval skeleton the other four
//! tasks share, so it owns its own `tokio-cron-scheduler` job instead
//! of going through [`PeriodicTask`](super::periodic_task::PeriodicTask).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::shared::error::SchedulerError;

const DAILY_RETENTION: usize = 7;
const WEEKLY_RETENTION: usize = 4;
const MONTHLY_RETENTION: usize = 12;

pub struct BackupTask {
    pool: sqlx::Pool<sqlx::Sqlite>,
    backup_dir: PathBuf,
}

impl BackupTask {
    pub fn new(pool: sqlx::Pool<sqlx::Sqlite>, backup_dir: impl Into<PathBuf>) -> Self {
        Self { pool, backup_dir: backup_dir.into() }
    }

    /// Registers the daily-at-03:00-UTC job on `scheduler` and starts it.
    pub async fn spawn(self: Arc<Self>, scheduler: &JobScheduler) -> Result<(), SchedulerError> {
        let this = self.clone();
        let job = Job::new_async("0 0 3 * * *", move |_uuid, _lock| {
            let this = this.clone();
            Box::pin(async move {
                if let Err(e) = this.run_backup().await {
                    error!(error = %e, "scheduled database backup failed");
                }
            })
        })
        .map_err(|e| SchedulerError::InvalidCron(e.to_string()))?;

        scheduler.add(job).await.map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;
        Ok(())
    }

    async fn run_backup(&self) -> Result<(), SchedulerError> {
        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;

        let now = chrono::Utc::now();
        let daily_path = self.backup_dir.join(format!("sublarr-{}.db", now.format("%Y%m%d")));

        sqlx::query(&format!("VACUUM INTO '{}'", daily_path.display()))
            .execute(&self.pool)
            .await
            .map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;

        if now.format("%u").to_string() == "7" {
            copy_rotated(&daily_path, &self.backup_dir.join(format!("sublarr-weekly-{}.db", now.format("%Y%W")))).await?;
        }
        if now.format("%d").to_string() == "01" {
            copy_rotated(&daily_path, &self.backup_dir.join(format!("sublarr-monthly-{}.db", now.format("%Y%m")))).await?;
        }

        prune_rotation(&self.backup_dir, "sublarr-2", DAILY_RETENTION).await;
        prune_rotation(&self.backup_dir, "sublarr-weekly-", WEEKLY_RETENTION).await;
        prune_rotation(&self.backup_dir, "sublarr-monthly-", MONTHLY_RETENTION).await;

        info!(path = %daily_path.display(), "database backup complete");
        Ok(())
    }
}

async fn copy_rotated(source: &Path, dest: &Path) -> Result<(), SchedulerError> {
    tokio::fs::copy(source, dest).await.map_err(|e| SchedulerError::TaskFailed(e.to_string()))?;
    Ok(())
}

async fn prune_rotation(dir: &Path, prefix: &str, keep: usize) {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else { return };
    let mut matches = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            matches.push(entry.path());
        }
    }
    matches.sort();
    if matches.len() > keep {
        for stale in &matches[..matches.len() - keep] {
            let _ = tokio::fs::remove_file(stale).await;
        }
    }
}
