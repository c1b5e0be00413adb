//! Cached provider search results, keyed by the query that produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::subtitle_result::SubtitleResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCacheEntry {
    pub cache_key: String,
    pub provider_name: String,
    pub results: Vec<SubtitleResult>,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ProviderCacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A (provider, subtitle) pair excluded from future download attempts,
/// e.g. after a download failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub provider_name: String,
    pub subtitle_id: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
