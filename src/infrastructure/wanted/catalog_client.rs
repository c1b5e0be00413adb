//! Catalog-client contract: the scanner's view onto whichever
//! external automation system owns the library -- media-manager A for
//! series, media-manager B for movies. Each implementation wraps that
//! system's own HTTP API; the scanner never talks to either directly.

use async_trait::async_trait;

use crate::domain::entities::ItemType;
use crate::shared::error::WantedError;

/// One library entry as reported by a catalog, already missing at
/// least one wanted-language subtitle.
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub item_type: ItemType,
    pub external_id: String,
    pub title: String,
    pub year: Option<u16>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub video_path: String,
    pub missing_languages: Vec<String>,
    pub is_anime: bool,
    pub tvdb_id: Option<u32>,
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Stable name for logging, e.g. `"media_manager_a"`.
    fn name(&self) -> &'static str;

    /// Lists every library item currently missing a wanted-language
    /// subtitle, per that system's own language-profile configuration.
    async fn list_wanted(&self) -> Result<Vec<CatalogItem>, WantedError>;

    /// Fetches richer per-item metadata (external ids, release tags)
    /// used to enrich a VideoQuery beyond what `list_wanted` returns.
    async fn item_metadata(&self, external_id: &str) -> Result<CatalogItem, WantedError>;
}
