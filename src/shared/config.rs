//! Startup configuration assembled from environment variables.
//!
//! Runtime-tunable values (scoring overrides, active translation backend,
//! provider enable lists, hook/webhook definitions) live in the DB-backed
//! `config_entries` table and are read through
//! [`crate::domain::repositories::ConfigRepository`] instead of here.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub data_dir: String,
    pub media_dir: String,
    pub port: u16,
    /// Series catalog automation endpoint (media-manager A)
    pub series_catalog_url: String,
    pub series_catalog_api_key: String,
    /// Movie catalog automation endpoint (media-manager B)
    pub movie_catalog_url: String,
    pub movie_catalog_api_key: String,
    pub jellyfin_url: Option<String>,
    pub jellyfin_api_key: Option<String>,
    pub plex_url: Option<String>,
    pub plex_token: Option<String>,
    pub backup_dir: String,
    pub wanted_scan_interval_secs: u64,
    pub wanted_search_interval_secs: u64,
    pub cleanup_interval_secs: u64,
    pub anidb_refresh_interval_secs: u64,
    pub anidb_mapping_url: String,
    pub job_queue_workers: usize,
    pub whisper_queue_permits: usize,
    pub webhook_hmac_secret: Option<String>,
    /// Default source language the translator engine assumes for
    /// externally-sourced subtitles and embedded streams.
    pub source_language: String,
    /// Whether the translator engine may extract and translate an
    /// embedded subtitle stream when no external source is present.
    pub use_embedded_subs: bool,
    /// Whether an on-disk target-language SRT may be upgraded to a
    /// better-scoring ASS download from a provider.
    pub upgrade_enabled: bool,
    /// Minimum score improvement an ASS candidate must show over the
    /// existing SRT before the upgrade is taken.
    pub upgrade_score_delta: i32,
    /// When a provider-downloaded target-language subtitle is SRT,
    /// whether to keep searching for an ASS result instead of writing
    /// the SRT directly.
    pub upgrade_prefer_ass: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:sublarr.db?mode=rwc".to_string());
        let data_dir = Self::extract_data_dir(&database_url);

        Ok(Self {
            media_dir: env::var("MEDIA_DIR").unwrap_or_else(|_| "/media".to_string()),
            data_dir: data_dir.clone(),
            database_url,
            port: env::var("PORT")
                .unwrap_or_else(|_| "9847".to_string())
                .parse()?,
            series_catalog_url: env::var("SERIES_CATALOG_URL").unwrap_or_default(),
            series_catalog_api_key: env::var("SERIES_CATALOG_API_KEY").unwrap_or_default(),
            movie_catalog_url: env::var("MOVIE_CATALOG_URL").unwrap_or_default(),
            movie_catalog_api_key: env::var("MOVIE_CATALOG_API_KEY").unwrap_or_default(),
            jellyfin_url: env::var("JELLYFIN_URL").ok(),
            jellyfin_api_key: env::var("JELLYFIN_API_KEY").ok(),
            plex_url: env::var("PLEX_URL").ok(),
            plex_token: env::var("PLEX_TOKEN").ok(),
            backup_dir: env::var("BACKUP_DIR").unwrap_or_else(|_| format!("{}/backups", data_dir)),
            wanted_scan_interval_secs: env_u64("WANTED_SCAN_INTERVAL_SECS", 3600),
            wanted_search_interval_secs: env_u64("WANTED_SEARCH_INTERVAL_SECS", 900),
            cleanup_interval_secs: env_u64("CLEANUP_INTERVAL_SECS", 86400),
            anidb_refresh_interval_secs: env_u64("ANIDB_REFRESH_INTERVAL_SECS", 604_800),
            anidb_mapping_url: env::var("ANIDB_MAPPING_URL")
                .unwrap_or_else(|_| "https://raw.githubusercontent.com/Anime-Lists/anime-lists/master/anime-list.xml".to_string()),
            job_queue_workers: env::var("JOB_QUEUE_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(num_cpus::get),
            whisper_queue_permits: env_u64("WHISPER_QUEUE_PERMITS", 1) as usize,
            webhook_hmac_secret: env::var("WEBHOOK_HMAC_SECRET").ok(),
            source_language: env::var("SOURCE_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
            use_embedded_subs: env_bool("USE_EMBEDDED_SUBS", true),
            upgrade_enabled: env_bool("UPGRADE_ENABLED", true),
            upgrade_score_delta: env::var("UPGRADE_SCORE_DELTA")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            upgrade_prefer_ass: env_bool("UPGRADE_PREFER_ASS", true),
        })
    }

    fn extract_data_dir(database_url: &str) -> String {
        let path_part = database_url
            .strip_prefix("sqlite:")
            .unwrap_or(database_url)
            .split('?')
            .next()
            .unwrap_or("");

        if path_part.is_empty() {
            return "./data".to_string();
        }

        let db_path = std::path::Path::new(path_part);
        if db_path.is_absolute() {
            return db_path
                .parent()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| "/data".to_string());
        }

        match db_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && parent != std::path::Path::new(".") => {
                parent.to_string_lossy().to_string()
            }
            _ => "./data".to_string(),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_data_dir_from_relative_path() {
        assert_eq!(Config::extract_data_dir("sqlite:data/sublarr.db?mode=rwc"), "data");
    }

    #[test]
    fn extracts_data_dir_from_absolute_path() {
        assert_eq!(Config::extract_data_dir("sqlite:/var/lib/sublarr/db.sqlite"), "/var/lib/sublarr");
    }

    #[test]
    fn falls_back_when_no_parent() {
        assert_eq!(Config::extract_data_dir("sqlite:db.sqlite"), "./data");
    }
}
