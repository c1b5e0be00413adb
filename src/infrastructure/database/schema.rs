//! Database Schema Management
//!
//! Creates every table the persisted-state list names: wanted items,
//! jobs, provider cache, blacklist, daily/provider stats, AniDB
//! mappings, and config entries. Idempotent -- safe to call on every
//! startup.

use sqlx::{Pool, Sqlite};
use tracing::info;

/// Initialize all database tables
///
/// Creates tables if they don't exist. Idempotent - safe to call
/// multiple times.
pub async fn initialize_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    info!("Initializing database schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wanted_items (
            id TEXT PRIMARY KEY,
            item_type TEXT NOT NULL,
            video_path TEXT NOT NULL,
            wanted_language TEXT NOT NULL,
            subtitle_kind TEXT NOT NULL,
            status TEXT NOT NULL,
            search_count INTEGER NOT NULL DEFAULT 0,
            last_searched_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(video_path, wanted_language)
        );
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_wanted_items_status ON wanted_items(status)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            wanted_item_id TEXT NOT NULL,
            state TEXT NOT NULL,
            progress INTEGER NOT NULL DEFAULT 0,
            phase TEXT NOT NULL DEFAULT '',
            error TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_state ON jobs(state)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS provider_cache (
            provider_name TEXT NOT NULL,
            cache_key TEXT NOT NULL,
            results_json TEXT NOT NULL,
            cached_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            PRIMARY KEY (provider_name, cache_key)
        );
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_provider_cache_expires ON provider_cache(expires_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blacklist (
            provider_name TEXT NOT NULL,
            subtitle_id TEXT NOT NULL,
            reason TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (provider_name, subtitle_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS daily_stats (
            date TEXT PRIMARY KEY,
            subtitles_translated INTEGER NOT NULL DEFAULT 0,
            subtitles_transcribed INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS provider_stats (
            date TEXT NOT NULL,
            provider_name TEXT NOT NULL,
            searches INTEGER NOT NULL DEFAULT 0,
            hits INTEGER NOT NULL DEFAULT 0,
            downloads INTEGER NOT NULL DEFAULT 0,
            failures INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (date, provider_name),
            FOREIGN KEY(date) REFERENCES daily_stats(date) ON DELETE CASCADE
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS anidb_mappings (
            anidb_id INTEGER PRIMARY KEY,
            catalog_series_id TEXT NOT NULL,
            season_offset INTEGER NOT NULL DEFAULT 0,
            refreshed_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_anidb_mappings_series ON anidb_mappings(catalog_series_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS config_entries (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn initializes_every_table() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("failed to create test pool");

        initialize_schema(&pool).await.expect("schema init failed");

        for table in [
            "wanted_items",
            "jobs",
            "provider_cache",
            "blacklist",
            "daily_stats",
            "provider_stats",
            "anidb_mappings",
            "config_entries",
        ] {
            let result: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|_| panic!("failed to check table {table}"));
            assert_eq!(result.0, 1, "missing table {table}");
        }
    }

    #[tokio::test]
    async fn idempotent_on_repeat_call() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("failed to create test pool");

        initialize_schema(&pool).await.expect("first init failed");
        initialize_schema(&pool).await.expect("second init should be idempotent");
    }
}
