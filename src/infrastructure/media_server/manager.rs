//! Registry of [`MediaServerBackend`] instances. Unlike the
//! provider manager or translation manager, which each stop
//! at the first usable collaborator, `refresh_all` notifies *every*
//! enabled, circuit-closed instance and never short-circuits on an
//! individual failure.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::entities::{CircuitBreakerState, ItemType};
use crate::shared::error::MediaServerError;

use super::backend_trait::MediaServerBackend;

struct Instance {
    backend: Arc<dyn MediaServerBackend>,
    enabled: bool,
    breaker: Mutex<CircuitBreakerState>,
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub backend_name: &'static str,
    pub result: Result<(), String>,
}

pub struct MediaServerManager {
    instances: Vec<Instance>,
}

impl MediaServerManager {
    pub fn new() -> Self {
        Self { instances: Vec::new() }
    }

    pub fn register(&mut self, backend: Arc<dyn MediaServerBackend>, enabled: bool) {
        self.instances.push(Instance {
            backend,
            enabled,
            breaker: Mutex::new(CircuitBreakerState::new(5, chrono::Duration::seconds(60))),
        });
    }

    /// Notifies every enabled, circuit-closed instance exactly once,
    /// regardless of individual outcomes. Backends that fail trip
    /// their own breaker; backends skipped by an open breaker are
    /// reported in line with a descriptive error rather than omitted.
    pub async fn refresh_all(&self, file_path: &str, item_type: ItemType) -> Vec<RefreshOutcome> {
        let mut outcomes = Vec::with_capacity(self.instances.len());

        for instance in &self.instances {
            if !instance.enabled {
                continue;
            }

            let name = instance.backend.name();
            let now = chrono::Utc::now();
            {
                let mut guard = instance.breaker.lock().await;
                if !guard.allow_request(now) {
                    outcomes.push(RefreshOutcome { backend_name: name, result: Err(format!("circuit open for server '{}'", name)) });
                    continue;
                }
            }

            match instance.backend.refresh_item(file_path, item_type.clone()).await {
                Ok(()) => {
                    instance.breaker.lock().await.record_success();
                    outcomes.push(RefreshOutcome { backend_name: name, result: Ok(()) });
                }
                Err(e) => {
                    warn!(server = name, error = %e, "media-server refresh failed");
                    instance.breaker.lock().await.record_failure(now);
                    outcomes.push(RefreshOutcome { backend_name: name, result: Err(e.to_string()) });
                }
            }
        }

        outcomes
    }

    pub async fn health_check_all(&self) -> Vec<(&'static str, Result<(), MediaServerError>)> {
        let mut results = Vec::with_capacity(self.instances.len());
        for instance in &self.instances {
            if !instance.enabled {
                continue;
            }
            results.push((instance.backend.name(), instance.backend.health_check().await));
        }
        results
    }
}

impl Default for MediaServerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyBackend {
        name: &'static str,
        calls: AtomicUsize,
        fails: bool,
    }

    #[async_trait]
    impl MediaServerBackend for FlakyBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn health_check(&self) -> Result<(), MediaServerError> {
            Ok(())
        }

        async fn refresh_item(&self, _file_path: &str, _item_type: ItemType) -> Result<(), MediaServerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                Err(MediaServerError::Http("boom".to_string()))
            } else {
                Ok(())
            }
        }

        async fn refresh_library(&self) -> Result<(), MediaServerError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn refresh_all_notifies_every_enabled_instance_despite_failure() {
        let mut manager = MediaServerManager::new();
        manager.register(Arc::new(FlakyBackend { name: "server-a", calls: AtomicUsize::new(0), fails: true }), true);
        manager.register(Arc::new(FlakyBackend { name: "server-b", calls: AtomicUsize::new(0), fails: false }), true);

        let outcomes = manager.refresh_all("/movies/foo.mkv", ItemType::Movie).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].result.is_ok());
    }

    #[tokio::test]
    async fn disabled_instances_are_skipped() {
        let mut manager = MediaServerManager::new();
        manager.register(Arc::new(FlakyBackend { name: "server-a", calls: AtomicUsize::new(0), fails: false }), false);

        let outcomes = manager.refresh_all("/movies/foo.mkv", ItemType::Movie).await;
        assert!(outcomes.is_empty());
    }
}
