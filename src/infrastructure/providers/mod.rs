//! Subtitle provider registry, shared HTTP session and manager.

pub mod archive;
pub mod hash_match;
pub mod http_session;
pub mod manager;
pub mod metadata_search;
pub mod provider_trait;

pub use http_session::HttpSession;
pub use manager::ProviderManager;
pub use provider_trait::{ProviderConfigField, RateLimit, SubtitleProvider};
