use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Sqlite};

use crate::domain::entities::AnidbMapping;
use crate::domain::repositories::AnidbRepository;
use crate::shared::error::RepositoryError;

#[derive(FromRow)]
struct AnidbRow {
    anidb_id: i64,
    catalog_series_id: String,
    season_offset: i64,
    refreshed_at: String,
}

impl TryFrom<AnidbRow> for AnidbMapping {
    type Error = RepositoryError;

    fn try_from(row: AnidbRow) -> Result<Self, Self::Error> {
        Ok(AnidbMapping {
            anidb_id: row.anidb_id.max(0) as u32,
            catalog_series_id: row.catalog_series_id,
            season_offset: row.season_offset as i32,
            refreshed_at: DateTime::parse_from_rfc3339(&row.refreshed_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| RepositoryError::Serialization(e.to_string()))?,
        })
    }
}

pub struct SqliteAnidbRepository {
    pool: Pool<Sqlite>,
}

impl SqliteAnidbRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnidbRepository for SqliteAnidbRepository {
    async fn upsert(&self, mapping: &AnidbMapping) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO anidb_mappings (anidb_id, catalog_series_id, season_offset, refreshed_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(anidb_id) DO UPDATE SET
                catalog_series_id = excluded.catalog_series_id,
                season_offset = excluded.season_offset,
                refreshed_at = excluded.refreshed_at
            "#,
        )
        .bind(mapping.anidb_id as i64)
        .bind(&mapping.catalog_series_id)
        .bind(mapping.season_offset as i64)
        .bind(mapping.refreshed_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_anidb_id(&self, anidb_id: u32) -> Result<Option<AnidbMapping>, RepositoryError> {
        let row: Option<AnidbRow> = sqlx::query_as("SELECT * FROM anidb_mappings WHERE anidb_id = ?")
            .bind(anidb_id as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.map(AnidbMapping::try_from).transpose()
    }

    async fn find_by_catalog_series_id(&self, catalog_series_id: &str) -> Result<Option<AnidbMapping>, RepositoryError> {
        let row: Option<AnidbRow> = sqlx::query_as("SELECT * FROM anidb_mappings WHERE catalog_series_id = ?")
            .bind(catalog_series_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(AnidbMapping::try_from).transpose()
    }

    async fn all(&self) -> Result<Vec<AnidbMapping>, RepositoryError> {
        let rows: Vec<AnidbRow> = sqlx::query_as("SELECT * FROM anidb_mappings").fetch_all(&self.pool).await?;
        rows.into_iter().map(AnidbMapping::try_from).collect()
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
    async fn upsert_then_lookup_both_keys() {
        let repo = SqliteAnidbRepository::new(test_pool().await);
        let mapping = AnidbMapping {
            anidb_id: 42,
            catalog_series_id: "tvdb-100".to_string(),
            season_offset: 1,
            refreshed_at: Utc::now(),
        };
        repo.upsert(&mapping).await.expect("upsert");

        assert_eq!(repo.find_by_anidb_id(42).await.expect("find").unwrap().catalog_series_id, "tvdb-100");
        assert_eq!(repo.find_by_catalog_series_id("tvdb-100").await.expect("find").unwrap().anidb_id, 42);
        assert_eq!(repo.all().await.expect("all").len(), 1);
    }

    #[tokio::test]
    async fn upsert_overwrites_existing() {
        let repo = SqliteAnidbRepository::new(test_pool().await);
        let mut mapping = AnidbMapping {
            anidb_id: 7,
            catalog_series_id: "tvdb-1".to_string(),
            season_offset: 0,
            refreshed_at: Utc::now(),
        };
        repo.upsert(&mapping).await.expect("upsert");
        mapping.season_offset = 2;
        repo.upsert(&mapping).await.expect("upsert again");

        let found = repo.find_by_anidb_id(7).await.expect("find").unwrap();
        assert_eq!(found.season_offset, 2);
    }
}
