use async_trait::async_trait;

use crate::domain::entities::{BlacklistEntry, ProviderCacheEntry};
use crate::shared::error::RepositoryError;

#[async_trait]
pub trait ProviderCacheRepository: Send + Sync {
    async fn get(&self, cache_key: &str, provider_name: &str) -> Result<Option<ProviderCacheEntry>, RepositoryError>;
    async fn put(&self, entry: &ProviderCacheEntry) -> Result<(), RepositoryError>;
    async fn purge_expired(&self, now: chrono::DateTime<chrono::Utc>) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait BlacklistRepository: Send + Sync {
    async fn add(&self, entry: &BlacklistEntry) -> Result<(), RepositoryError>;
    async fn is_blacklisted(&self, provider_name: &str, subtitle_id: &str) -> Result<bool, RepositoryError>;
    async fn list_for_provider(&self, provider_name: &str) -> Result<Vec<BlacklistEntry>, RepositoryError>;
}
