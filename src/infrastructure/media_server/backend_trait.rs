//! Media-server backend contract. Every backend (Jellyfin, Plex,
//! ...) implements this trait and owns its own
//! [`CircuitBreakerState`](crate::domain::CircuitBreakerState), held by
//! the manager alongside it rather than inside the backend itself.

use async_trait::async_trait;

use crate::domain::entities::ItemType;
use crate::shared::error::MediaServerError;

#[async_trait]
pub trait MediaServerBackend: Send + Sync {
    /// Stable registry name, e.g. `"jellyfin"`, `"plex"`.
    fn name(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), MediaServerError>;

    /// Refreshes the single library item at `file_path`. Backends that
    /// cannot resolve a path to a library item fall back to
    /// [`refresh_library`](Self::refresh_library) internally rather
    /// than erroring.
    async fn refresh_item(&self, file_path: &str, item_type: ItemType) -> Result<(), MediaServerError>;

    async fn refresh_library(&self) -> Result<(), MediaServerError>;
}
