use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Sqlite};

use crate::domain::entities::{BlacklistEntry, ProviderCacheEntry, SubtitleResult};
use crate::domain::repositories::{BlacklistRepository, ProviderCacheRepository};
use crate::shared::error::RepositoryError;

#[derive(FromRow)]
struct CacheRow {
    provider_name: String,
    cache_key: String,
    results_json: String,
    cached_at: String,
    expires_at: String,
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Serialization(e.to_string()))
}

impl TryFrom<CacheRow> for ProviderCacheEntry {
    type Error = RepositoryError;

    fn try_from(row: CacheRow) -> Result<Self, Self::Error> {
        let results: Vec<SubtitleResult> =
            serde_json::from_str(&row.results_json).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Ok(ProviderCacheEntry {
            cache_key: row.cache_key,
            provider_name: row.provider_name,
            results,
            cached_at: parse_timestamp(&row.cached_at)?,
            expires_at: parse_timestamp(&row.expires_at)?,
        })
    }
}

pub struct SqliteProviderCacheRepository {
    pool: Pool<Sqlite>,
}

impl SqliteProviderCacheRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderCacheRepository for SqliteProviderCacheRepository {
    async fn get(&self, cache_key: &str, provider_name: &str) -> Result<Option<ProviderCacheEntry>, RepositoryError> {
        let row: Option<CacheRow> =
            sqlx::query_as("SELECT * FROM provider_cache WHERE cache_key = ? AND provider_name = ?")
                .bind(cache_key)
                .bind(provider_name)
                .fetch_optional(&self.pool)
                .await?;
        row.map(ProviderCacheEntry::try_from).transpose()
    }

    async fn put(&self, entry: &ProviderCacheEntry) -> Result<(), RepositoryError> {
        let results_json =
            serde_json::to_string(&entry.results).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO provider_cache (provider_name, cache_key, results_json, cached_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(provider_name, cache_key) DO UPDATE SET
                results_json = excluded.results_json,
                cached_at = excluded.cached_at,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(&entry.provider_name)
        .bind(&entry.cache_key)
        .bind(results_json)
        .bind(entry.cached_at.to_rfc3339())
        .bind(entry.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM provider_cache WHERE expires_at < ?")
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(FromRow)]
struct BlacklistRow {
    provider_name: String,
    subtitle_id: String,
    reason: String,
    created_at: String,
}

impl TryFrom<BlacklistRow> for BlacklistEntry {
    type Error = RepositoryError;

    fn try_from(row: BlacklistRow) -> Result<Self, Self::Error> {
        Ok(BlacklistEntry {
            provider_name: row.provider_name,
            subtitle_id: row.subtitle_id,
            reason: row.reason,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

pub struct SqliteBlacklistRepository {
    pool: Pool<Sqlite>,
}

impl SqliteBlacklistRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlacklistRepository for SqliteBlacklistRepository {
    async fn add(&self, entry: &BlacklistEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO blacklist (provider_name, subtitle_id, reason, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(provider_name, subtitle_id) DO UPDATE SET
                reason = excluded.reason,
                created_at = excluded.created_at
            "#,
        )
        .bind(&entry.provider_name)
        .bind(&entry.subtitle_id)
        .bind(&entry.reason)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_blacklisted(&self, provider_name: &str, subtitle_id: &str) -> Result<bool, RepositoryError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM blacklist WHERE provider_name = ? AND subtitle_id = ?")
                .bind(provider_name)
                .bind(subtitle_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn list_for_provider(&self, provider_name: &str) -> Result<Vec<BlacklistEntry>, RepositoryError> {
        let rows: Vec<BlacklistRow> = sqlx::query_as("SELECT * FROM blacklist WHERE provider_name = ?")
            .bind(provider_name)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(BlacklistEntry::try_from).collect()
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
    async fn cache_put_get_and_purge() {
        let pool = test_pool().await;
        let repo = SqliteProviderCacheRepository::new(pool);
        let now = Utc::now();
        let entry = ProviderCacheEntry {
            cache_key: "show-s01e01".to_string(),
            provider_name: "opensubtitles".to_string(),
            results: vec![SubtitleResult::new("opensubtitles", "123", "fr")],
            cached_at: now,
            expires_at: now - chrono::Duration::seconds(1),
        };

        repo.put(&entry).await.expect("put");
        let fetched = repo.get("show-s01e01", "opensubtitles").await.expect("get").expect("present");
        assert_eq!(fetched.results.len(), 1);

        let purged = repo.purge_expired(now).await.expect("purge");
        assert_eq!(purged, 1);
        assert!(repo.get("show-s01e01", "opensubtitles").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn blacklist_add_and_check() {
        let pool = test_pool().await;
        let repo = SqliteBlacklistRepository::new(pool);
        let entry = BlacklistEntry {
            provider_name: "opensubtitles".to_string(),
            subtitle_id: "bad-sub".to_string(),
            reason: "malformed encoding".to_string(),
            created_at: Utc::now(),
        };
        repo.add(&entry).await.expect("add");
        assert!(repo.is_blacklisted("opensubtitles", "bad-sub").await.expect("check"));
        assert!(!repo.is_blacklisted("opensubtitles", "other").await.expect("check"));
        assert_eq!(repo.list_for_provider("opensubtitles").await.expect("list").len(), 1);
    }
}
