use async_trait::async_trait;

use crate::domain::entities::AnidbMapping;
use crate::shared::error::RepositoryError;

#[async_trait]
pub trait AnidbRepository: Send + Sync {
    async fn upsert(&self, mapping: &AnidbMapping) -> Result<(), RepositoryError>;
    async fn find_by_anidb_id(&self, anidb_id: u32) -> Result<Option<AnidbMapping>, RepositoryError>;
    async fn find_by_catalog_series_id(&self, catalog_series_id: &str) -> Result<Option<AnidbMapping>, RepositoryError>;
    async fn all(&self) -> Result<Vec<AnidbMapping>, RepositoryError>;
}
