//! Periodic schedulers. Four tasks share the hours-interval
//! [`PeriodicTask`] skeleton; the backup task runs on its own cron
//! schedule via `tokio-cron-scheduler`.

pub mod anidb_refresh_task;
pub mod backup_task;
pub mod cleanup_task;
pub mod periodic_task;
pub mod wanted_scan_task;
pub mod wanted_search_task;

pub use anidb_refresh_task::AnidbRefreshTask;
pub use backup_task::BackupTask;
pub use cleanup_task::CleanupTask;
pub use periodic_task::{PeriodicTask, ScheduledTask};
pub use wanted_scan_task::WantedScanTask;
pub use wanted_search_task::WantedSearchTask;
