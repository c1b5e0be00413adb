//! SQLite-backed implementations of the domain repository traits.
//!
//! Each entity round-trips through a thin row struct mapped with
//! `sqlx::FromRow`; compound or open-ended fields (subtitle matches,
//! provider stat breakdowns) are stored as a JSON column rather than
//! normalized, mirroring how the teacher's cache/events tables serialize
//! payloads instead of inventing extra join tables for infrequently
//! queried shapes.

mod anidb_repository;
mod config_repository;
mod job_repository;
mod provider_cache_repository;
mod stats_repository;
mod wanted_repository;

pub use anidb_repository::SqliteAnidbRepository;
pub use config_repository::SqliteConfigRepository;
pub use job_repository::SqliteJobRepository;
pub use provider_cache_repository::{SqliteBlacklistRepository, SqliteProviderCacheRepository};
pub use stats_repository::SqliteStatsRepository;
pub use wanted_repository::SqliteWantedRepository;
