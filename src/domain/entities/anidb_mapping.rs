//! AniDB <-> catalog ID mapping, refreshed periodically by the AniDB refresh task
//! and consulted by the wanted scanner for anime-numbered series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnidbMapping {
    pub anidb_id: u32,
    pub catalog_series_id: String,
    pub season_offset: i32,
    pub refreshed_at: DateTime<Utc>,
}
