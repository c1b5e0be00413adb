use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, Pool, Sqlite};

use crate::domain::entities::{DailyStat, ProviderStat};
use crate::domain::repositories::StatsRepository;
use crate::shared::error::RepositoryError;

#[derive(FromRow)]
struct DailyStatRow {
    date: String,
    subtitles_translated: i64,
    subtitles_transcribed: i64,
}

#[derive(FromRow)]
struct ProviderStatRow {
    provider_name: String,
    searches: i64,
    hits: i64,
    downloads: i64,
    failures: i64,
}

fn parse_date(s: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| RepositoryError::Serialization(e.to_string()))
}

pub struct SqliteStatsRepository {
    pool: Pool<Sqlite>,
}

impl SqliteStatsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn load(&self, date: NaiveDate) -> Result<Option<DailyStat>, RepositoryError> {
        let row: Option<DailyStatRow> = sqlx::query_as("SELECT * FROM daily_stats WHERE date = ?")
            .bind(date.to_string())
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else { return Ok(None) };

        let provider_rows: Vec<ProviderStatRow> =
            sqlx::query_as("SELECT provider_name, searches, hits, downloads, failures FROM provider_stats WHERE date = ?")
                .bind(date.to_string())
                .fetch_all(&self.pool)
                .await?;

        Ok(Some(DailyStat {
            date: parse_date(&row.date)?,
            providers: provider_rows
                .into_iter()
                .map(|p| ProviderStat {
                    provider_name: p.provider_name,
                    searches: p.searches.max(0) as u32,
                    hits: p.hits.max(0) as u32,
                    downloads: p.downloads.max(0) as u32,
                    failures: p.failures.max(0) as u32,
                })
                .collect(),
            subtitles_translated: row.subtitles_translated.max(0) as u32,
            subtitles_transcribed: row.subtitles_transcribed.max(0) as u32,
        }))
    }
}

#[async_trait]
impl StatsRepository for SqliteStatsRepository {
    async fn get(&self, date: NaiveDate) -> Result<Option<DailyStat>, RepositoryError> {
        self.load(date).await
    }

    async fn upsert(&self, stat: &DailyStat) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO daily_stats (date, subtitles_translated, subtitles_transcribed)
            VALUES (?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                subtitles_translated = excluded.subtitles_translated,
                subtitles_transcribed = excluded.subtitles_transcribed
            "#,
        )
        .bind(stat.date.to_string())
        .bind(stat.subtitles_translated as i64)
        .bind(stat.subtitles_transcribed as i64)
        .execute(&mut *tx)
        .await?;

        for provider in &stat.providers {
            sqlx::query(
                r#"
                INSERT INTO provider_stats (date, provider_name, searches, hits, downloads, failures)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(date, provider_name) DO UPDATE SET
                    searches = excluded.searches,
                    hits = excluded.hits,
                    downloads = excluded.downloads,
                    failures = excluded.failures
                "#,
            )
            .bind(stat.date.to_string())
            .bind(&provider.provider_name)
            .bind(provider.searches as i64)
            .bind(provider.hits as i64)
            .bind(provider.downloads as i64)
            .bind(provider.failures as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyStat>, RepositoryError> {
        let rows: Vec<DailyStatRow> =
            sqlx::query_as("SELECT * FROM daily_stats WHERE date >= ? AND date <= ? ORDER BY date ASC")
                .bind(from.to_string())
                .bind(to.to_string())
                .fetch_all(&self.pool)
                .await?;

        let mut stats = Vec::with_capacity(rows.len());
        for row in rows {
            let date = parse_date(&row.date)?;
            if let Some(stat) = self.load(date).await? {
                stats.push(stat);
            }
        }
        Ok(stats)
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
    async fn upsert_and_get_roundtrip() {
        let repo = SqliteStatsRepository::new(test_pool().await);
        let date = NaiveDate::from_ymd_opt(2026, 7, 28).unwrap();
        let mut stat = DailyStat::new(date);
        stat.subtitles_translated = 3;
        stat.provider_mut("opensubtitles").searches = 5;
        stat.provider_mut("opensubtitles").hits = 2;

        repo.upsert(&stat).await.expect("upsert");
        let fetched = repo.get(date).await.expect("get").expect("present");
        assert_eq!(fetched.subtitles_translated, 3);
        assert_eq!(fetched.providers.len(), 1);
        assert_eq!(fetched.providers[0].hits, 2);

        stat.subtitles_translated = 4;
        repo.upsert(&stat).await.expect("upsert again");
        let fetched = repo.get(date).await.expect("get").expect("present");
        assert_eq!(fetched.subtitles_translated, 4);
    }

    #[tokio::test]
    async fn range_returns_ordered_stats() {
        let repo = SqliteStatsRepository::new(test_pool().await);
        let d1 = NaiveDate::from_ymd_opt(2026, 7, 26).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        repo.upsert(&DailyStat::new(d1)).await.expect("upsert d1");
        repo.upsert(&DailyStat::new(d2)).await.expect("upsert d2");

        let range = repo.range(d1, d2).await.expect("range");
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].date, d1);
    }
}
