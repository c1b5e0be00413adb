use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::domain::repositories::ConfigRepository;
use crate::shared::error::RepositoryError;

pub struct SqliteConfigRepository {
    pool: Pool<Sqlite>,
}

impl SqliteConfigRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigRepository for SqliteConfigRepository {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM config_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO config_entries (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM config_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
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
    async fn set_get_delete_roundtrip() {
        let repo = SqliteConfigRepository::new(test_pool().await);
        assert!(repo.get_raw("wanted_scan_interval_hours").await.expect("get").is_none());

        repo.set_raw("wanted_scan_interval_hours", "12").await.expect("set");
        assert_eq!(repo.get_raw("wanted_scan_interval_hours").await.expect("get"), Some("12".to_string()));

        repo.set_raw("wanted_scan_interval_hours", "6").await.expect("overwrite");
        assert_eq!(repo.get_raw("wanted_scan_interval_hours").await.expect("get"), Some("6".to_string()));

        repo.delete("wanted_scan_interval_hours").await.expect("delete");
        assert!(repo.get_raw("wanted_scan_interval_hours").await.expect("get").is_none());
    }
}
