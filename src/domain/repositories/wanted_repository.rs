use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{WantedItem, WantedStatus};
use crate::shared::error::RepositoryError;

#[async_trait]
pub trait WantedRepository: Send + Sync {
    async fn insert(&self, item: &WantedItem) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<WantedItem>, RepositoryError>;
    async fn find_by_path_and_language(
        &self,
        video_path: &str,
        language: &str,
    ) -> Result<Option<WantedItem>, RepositoryError>;
    async fn list_by_status(&self, status: WantedStatus) -> Result<Vec<WantedItem>, RepositoryError>;
    async fn update(&self, item: &WantedItem) -> Result<(), RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
