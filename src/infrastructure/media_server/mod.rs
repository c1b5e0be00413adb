//! Fan-out refresh to every configured media-server backend.

pub mod backend_trait;
pub mod jellyfin;
pub mod manager;
pub mod plex;

pub use backend_trait::MediaServerBackend;
pub use jellyfin::JellyfinBackend;
pub use manager::{MediaServerManager, RefreshOutcome};
pub use plex::PlexBackend;
