//! Repository traits - abstractions over persistence, implemented by
//! `infrastructure::persistence::sqlite`.

pub mod wanted_repository;
pub mod job_repository;
pub mod provider_cache_repository;
pub mod stats_repository;
pub mod anidb_repository;
pub mod config_repository;

pub use wanted_repository::WantedRepository;
pub use job_repository::JobRepository;
pub use provider_cache_repository::{BlacklistRepository, ProviderCacheRepository};
pub use stats_repository::StatsRepository;
pub use anidb_repository::AnidbRepository;
pub use config_repository::{ConfigRepository, ConfigStore};
