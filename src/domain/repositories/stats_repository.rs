use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::entities::DailyStat;
use crate::shared::error::RepositoryError;

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn get(&self, date: NaiveDate) -> Result<Option<DailyStat>, RepositoryError>;
    async fn upsert(&self, stat: &DailyStat) -> Result<(), RepositoryError>;
    async fn range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyStat>, RepositoryError>;
}
