use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Sqlite};
use uuid::Uuid;

use crate::domain::entities::{Job, JobKind, JobState};
use crate::domain::repositories::JobRepository;
use crate::shared::error::RepositoryError;

#[derive(FromRow)]
struct JobRow {
    id: String,
    kind: String,
    wanted_item_id: String,
    state: String,
    progress: i64,
    phase: String,
    error: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<JobRow> for Job {
    type Error = RepositoryError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: Uuid::parse_str(&row.id).map_err(|e| RepositoryError::Serialization(e.to_string()))?,
            kind: parse_kind(&row.kind)?,
            wanted_item_id: Uuid::parse_str(&row.wanted_item_id)
                .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
            state: parse_state(&row.state)?,
            progress: row.progress.clamp(0, 100) as u8,
            phase: row.phase,
            error: row.error,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn parse_kind(s: &str) -> Result<JobKind, RepositoryError> {
    match s {
        "translate" => Ok(JobKind::Translate),
        "transcribe" => Ok(JobKind::Transcribe),
        other => Err(RepositoryError::Serialization(format!("unknown job kind {other}"))),
    }
}

fn kind_str(kind: JobKind) -> &'static str {
    match kind {
        JobKind::Translate => "translate",
        JobKind::Transcribe => "transcribe",
    }
}

fn parse_state(s: &str) -> Result<JobState, RepositoryError> {
    match s {
        "pending" => Ok(JobState::Pending),
        "processing" => Ok(JobState::Processing),
        "completed" => Ok(JobState::Completed),
        "failed" => Ok(JobState::Failed),
        "cancelled" => Ok(JobState::Cancelled),
        other => Err(RepositoryError::Serialization(format!("unknown job state {other}"))),
    }
}

fn state_str(state: JobState) -> &'static str {
    match state {
        JobState::Pending => "pending",
        JobState::Processing => "processing",
        JobState::Completed => "completed",
        JobState::Failed => "failed",
        JobState::Cancelled => "cancelled",
    }
}

pub struct SqliteJobRepository {
    pool: Pool<Sqlite>,
}

impl SqliteJobRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn insert(&self, job: &Job) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, kind, wanted_item_id, state, progress, phase, error, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(job.id.to_string())
        .bind(kind_str(job.kind))
        .bind(job.wanted_item_id.to_string())
        .bind(state_str(job.state))
        .bind(job.progress as i64)
        .bind(&job.phase)
        .bind(&job.error)
        .bind(job.created_at.to_rfc3339())
        .bind(job.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        let row: Option<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Job::try_from).transpose()
    }

    async fn list_by_state(&self, state: JobState) -> Result<Vec<Job>, RepositoryError> {
        let rows: Vec<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE state = ?")
            .bind(state_str(state))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Job::try_from).collect()
    }

    async fn update(&self, job: &Job) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs SET state = ?, progress = ?, phase = ?, error = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(state_str(job.state))
        .bind(job.progress as i64)
        .bind(&job.phase)
        .bind(&job.error)
        .bind(job.updated_at.to_rfc3339())
        .bind(job.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(job.id.to_string()));
        }
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM jobs WHERE updated_at < ? AND state IN ('completed', 'failed', 'cancelled')",
        )
        .bind(cutoff.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::initialize_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> Pool<Sqlite> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("pool");
        initialize_schema(&pool).await.expect("schema");
        pool
    }

    #[tokio::test]
    async fn insert_update_list_roundtrip() {
        let repo = SqliteJobRepository::new(test_pool().await);
        let mut job = Job::new(JobKind::Translate, Uuid::new_v4());
        repo.insert(&job).await.expect("insert");

        job.complete();
        repo.update(&job).await.expect("update");

        let completed = repo.list_by_state(JobState::Completed).await.expect("list");
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].progress, 100);
    }

    #[tokio::test]
    async fn delete_older_than_only_touches_terminal_jobs() {
        let repo = SqliteJobRepository::new(test_pool().await);
        let mut old_completed = Job::new(JobKind::Translate, Uuid::new_v4());
        old_completed.complete();
        old_completed.updated_at = Utc::now() - chrono::Duration::days(30);
        repo.insert(&old_completed).await.expect("insert");

        let mut old_pending = Job::new(JobKind::Translate, Uuid::new_v4());
        old_pending.updated_at = Utc::now() - chrono::Duration::days(30);
        repo.insert(&old_pending).await.expect("insert");

        let pruned = repo
            .delete_older_than(Utc::now() - chrono::Duration::days(7))
            .await
            .expect("prune");
        assert_eq!(pruned, 1);
        assert!(repo.find_by_id(old_pending.id).await.expect("find").is_some());
    }
}
