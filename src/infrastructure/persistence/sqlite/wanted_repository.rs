use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Sqlite};
use uuid::Uuid;

use crate::domain::entities::{ItemType, SubtitleKind, WantedItem, WantedStatus};
use crate::domain::repositories::WantedRepository;
use crate::shared::error::RepositoryError;

#[derive(FromRow)]
struct WantedRow {
    id: String,
    item_type: String,
    video_path: String,
    wanted_language: String,
    subtitle_kind: String,
    status: String,
    search_count: i64,
    last_searched_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<WantedRow> for WantedItem {
    type Error = RepositoryError;

    fn try_from(row: WantedRow) -> Result<Self, Self::Error> {
        Ok(WantedItem {
            id: Uuid::parse_str(&row.id).map_err(|e| RepositoryError::Serialization(e.to_string()))?,
            item_type: parse_item_type(&row.item_type)?,
            video_path: row.video_path,
            wanted_language: row.wanted_language,
            subtitle_kind: parse_subtitle_kind(&row.subtitle_kind)?,
            status: parse_status(&row.status)?,
            search_count: row.search_count.max(0) as u32,
            last_searched_at: row
                .last_searched_at
                .map(|s| parse_timestamp(&s))
                .transpose()?,
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

fn parse_item_type(s: &str) -> Result<ItemType, RepositoryError> {
    match s {
        "episode" => Ok(ItemType::Episode),
        "movie" => Ok(ItemType::Movie),
        other => Err(RepositoryError::Serialization(format!("unknown item_type {other}"))),
    }
}

fn item_type_str(item_type: ItemType) -> &'static str {
    match item_type {
        ItemType::Episode => "episode",
        ItemType::Movie => "movie",
    }
}

fn parse_subtitle_kind(s: &str) -> Result<SubtitleKind, RepositoryError> {
    match s {
        "translated" => Ok(SubtitleKind::Translated),
        "transcribed" => Ok(SubtitleKind::Transcribed),
        other => Err(RepositoryError::Serialization(format!("unknown subtitle_kind {other}"))),
    }
}

fn subtitle_kind_str(kind: SubtitleKind) -> &'static str {
    match kind {
        SubtitleKind::Translated => "translated",
        SubtitleKind::Transcribed => "transcribed",
    }
}

fn parse_status(s: &str) -> Result<WantedStatus, RepositoryError> {
    match s {
        "pending" => Ok(WantedStatus::Pending),
        "not_found" => Ok(WantedStatus::NotFound),
        "fulfilled" => Ok(WantedStatus::Fulfilled),
        "ignored" => Ok(WantedStatus::Ignored),
        other => Err(RepositoryError::Serialization(format!("unknown status {other}"))),
    }
}

fn status_str(status: WantedStatus) -> &'static str {
    match status {
        WantedStatus::Pending => "pending",
        WantedStatus::NotFound => "not_found",
        WantedStatus::Fulfilled => "fulfilled",
        WantedStatus::Ignored => "ignored",
    }
}

pub struct SqliteWantedRepository {
    pool: Pool<Sqlite>,
}

impl SqliteWantedRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WantedRepository for SqliteWantedRepository {
    async fn insert(&self, item: &WantedItem) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO wanted_items
                (id, item_type, video_path, wanted_language, subtitle_kind, status, search_count, last_searched_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item_type_str(item.item_type))
        .bind(&item.video_path)
        .bind(&item.wanted_language)
        .bind(subtitle_kind_str(item.subtitle_kind))
        .bind(status_str(item.status))
        .bind(item.search_count as i64)
        .bind(item.last_searched_at.map(|dt| dt.to_rfc3339()))
        .bind(item.created_at.to_rfc3339())
        .bind(item.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WantedItem>, RepositoryError> {
        let row: Option<WantedRow> = sqlx::query_as("SELECT * FROM wanted_items WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(WantedItem::try_from).transpose()
    }

    async fn find_by_path_and_language(
        &self,
        video_path: &str,
        language: &str,
    ) -> Result<Option<WantedItem>, RepositoryError> {
        let row: Option<WantedRow> = sqlx::query_as(
            "SELECT * FROM wanted_items WHERE video_path = ? AND wanted_language = ?",
        )
        .bind(video_path)
        .bind(language)
        .fetch_optional(&self.pool)
        .await?;
        row.map(WantedItem::try_from).transpose()
    }

    async fn list_by_status(&self, status: WantedStatus) -> Result<Vec<WantedItem>, RepositoryError> {
        let rows: Vec<WantedRow> = sqlx::query_as("SELECT * FROM wanted_items WHERE status = ?")
            .bind(status_str(status))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(WantedItem::try_from).collect()
    }

    async fn update(&self, item: &WantedItem) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE wanted_items
            SET item_type = ?, video_path = ?, wanted_language = ?, subtitle_kind = ?,
                status = ?, search_count = ?, last_searched_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(item_type_str(item.item_type))
        .bind(&item.video_path)
        .bind(&item.wanted_language)
        .bind(subtitle_kind_str(item.subtitle_kind))
        .bind(status_str(item.status))
        .bind(item.search_count as i64)
        .bind(item.last_searched_at.map(|dt| dt.to_rfc3339()))
        .bind(item.updated_at.to_rfc3339())
        .bind(item.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(item.id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM wanted_items WHERE id = ?")
            .bind(id.to_string())
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
    async fn insert_find_update_roundtrip() {
        let repo = SqliteWantedRepository::new(test_pool().await);
        let mut item = WantedItem::new(ItemType::Episode, "/tv/show/s01e01.mkv", "fr", SubtitleKind::Translated);

        repo.insert(&item).await.expect("insert");
        let found = repo
            .find_by_path_and_language("/tv/show/s01e01.mkv", "fr")
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.id, item.id);
        assert_eq!(found.status, WantedStatus::Pending);

        item.mark_searched(true);
        repo.update(&item).await.expect("update");

        let fulfilled = repo.list_by_status(WantedStatus::Fulfilled).await.expect("list");
        assert_eq!(fulfilled.len(), 1);
        assert_eq!(fulfilled[0].search_count, 1);
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let repo = SqliteWantedRepository::new(test_pool().await);
        let item = WantedItem::new(ItemType::Movie, "/movies/a.mkv", "es", SubtitleKind::Transcribed);
        repo.insert(&item).await.expect("insert");
        repo.delete(item.id).await.expect("delete");
        assert!(repo.find_by_id(item.id).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn update_unknown_id_errors() {
        let repo = SqliteWantedRepository::new(test_pool().await);
        let item = WantedItem::new(ItemType::Movie, "/movies/missing.mkv", "de", SubtitleKind::Translated);
        assert!(repo.update(&item).await.is_err());
    }
}
