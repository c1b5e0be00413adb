//! Contract a subtitle provider implements: declarative metadata
//! plus the three calls the manager drives it through.

use async_trait::async_trait;

use crate::domain::entities::{SubtitleResult, VideoQuery};
use crate::shared::error::ProviderError;

use super::http_session::HttpSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests: u32,
    pub per_seconds: u32,
}

#[derive(Debug, Clone)]
pub struct ProviderConfigField {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
}

#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// ISO 639-1 codes this provider can search for.
    fn supported_languages(&self) -> &'static [&'static str];

    fn config_fields(&self) -> Vec<ProviderConfigField> {
        Vec::new()
    }

    fn rate_limit(&self) -> RateLimit;

    fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(20)
    }

    fn max_retries(&self) -> u32 {
        3
    }

    /// Third-party/dynamically-loaded providers get looser trust defaults
    /// in scoring and are excluded from auto-prioritization.
    fn is_plugin(&self) -> bool {
        false
    }

    /// Called once at registration; providers that need a login session
    /// establish it here rather than per-search.
    async fn initialize(&self, session: &HttpSession) -> Result<(), ProviderError>;

    async fn terminate(&self) {}

    async fn search(&self, session: &HttpSession, query: &VideoQuery) -> Result<Vec<SubtitleResult>, ProviderError>;

    async fn download(&self, session: &HttpSession, result: &SubtitleResult) -> Result<Vec<u8>, ProviderError>;

    /// Cheap reachability probe used by the manager's health endpoint;
    /// returns `(healthy, detail)`.
    async fn health_check(&self, session: &HttpSession) -> (bool, String);
}
