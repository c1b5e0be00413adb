use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Job, JobState};
use crate::shared::error::RepositoryError;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: &Job) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;
    async fn list_by_state(&self, state: JobState) -> Result<Vec<Job>, RepositoryError>;
    async fn update(&self, job: &Job) -> Result<(), RepositoryError>;
    async fn delete_older_than(&self, cutoff: chrono::DateTime<chrono::Utc>) -> Result<u64, RepositoryError>;
}
