//! Wanted-item scanner. Polls every configured catalog client,
//! materialising a [`WantedItem`] row per (file_path, language) the
//! catalog reports missing. Idempotent: an existing row for the same
//! key is left as-is rather than duplicated.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::domain::entities::{SubtitleKind, WantedItem};
use crate::domain::repositories::WantedRepository;
use crate::shared::error::WantedError;

use super::catalog_client::CatalogClient;

pub struct WantedScanner {
    clients: Vec<Arc<dyn CatalogClient>>,
    repository: Arc<dyn WantedRepository>,
    running: AtomicBool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ScanSummary {
    pub inserted: usize,
    pub already_known: usize,
}

impl WantedScanner {
    pub fn new(clients: Vec<Arc<dyn CatalogClient>>, repository: Arc<dyn WantedRepository>) -> Self {
        Self { clients, repository, running: AtomicBool::new(false) }
    }

    /// Runs one scan pass across every registered catalog client. A
    /// second call while a scan is already in flight returns
    /// `AlreadyRunning`-flavoured error-free no-op: callers that need
    /// to observe this should check `is_running` first.
    pub async fn scan(&self) -> Result<ScanSummary, WantedError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(ScanSummary::default());
        }
        let result = self.scan_inner().await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn scan_inner(&self) -> Result<ScanSummary, WantedError> {
        let mut summary = ScanSummary::default();

        for client in &self.clients {
            let items = match client.list_wanted().await {
                Ok(items) => items,
                Err(e) => {
                    warn!(catalog = client.name(), error = %e, "catalog scan failed");
                    continue;
                }
            };

            for item in items {
                for language in &item.missing_languages {
                    let existing = self
                        .repository
                        .find_by_path_and_language(&item.video_path, language)
                        .await?;

                    if existing.is_some() {
                        summary.already_known += 1;
                        continue;
                    }

                    let wanted = WantedItem::new(item.item_type.clone(), item.video_path.clone(), language.clone(), SubtitleKind::Translated);
                    self.repository.insert(&wanted).await?;
                    summary.inserted += 1;
                }
            }
        }

        info!(inserted = summary.inserted, already_known = summary.already_known, "wanted scan complete");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::WantedStatus;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use uuid::Uuid;

    use crate::domain::entities::ItemType;
    use crate::infrastructure::wanted::catalog_client::CatalogItem;

    struct StubCatalog(Vec<CatalogItem>);

    #[async_trait]
    impl CatalogClient for StubCatalog {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn list_wanted(&self) -> Result<Vec<CatalogItem>, WantedError> {
            Ok(self.0.clone())
        }

        async fn item_metadata(&self, _external_id: &str) -> Result<CatalogItem, WantedError> {
            Ok(self.0[0].clone())
        }
    }

    #[derive(Default)]
    struct InMemoryWanted(StdMutex<Vec<WantedItem>>);

    #[async_trait]
    impl WantedRepository for InMemoryWanted {
        async fn insert(&self, item: &WantedItem) -> Result<(), crate::shared::error::RepositoryError> {
            self.0.lock().unwrap().push(item.clone());
            Ok(())
        }
        async fn find_by_id(&self, id: Uuid) -> Result<Option<WantedItem>, crate::shared::error::RepositoryError> {
            Ok(self.0.lock().unwrap().iter().find(|i| i.id == id).cloned())
        }
        async fn find_by_path_and_language(&self, video_path: &str, language: &str) -> Result<Option<WantedItem>, crate::shared::error::RepositoryError> {
            Ok(self.0.lock().unwrap().iter().find(|i| i.video_path == video_path && i.wanted_language == language).cloned())
        }
        async fn list_by_status(&self, status: WantedStatus) -> Result<Vec<WantedItem>, crate::shared::error::RepositoryError> {
            Ok(self.0.lock().unwrap().iter().filter(|i| i.status == status).cloned().collect())
        }
        async fn update(&self, item: &WantedItem) -> Result<(), crate::shared::error::RepositoryError> {
            let mut items = self.0.lock().unwrap();
            if let Some(existing) = items.iter_mut().find(|i| i.id == item.id) {
                *existing = item.clone();
            }
            Ok(())
        }
        async fn delete(&self, id: Uuid) -> Result<(), crate::shared::error::RepositoryError> {
            self.0.lock().unwrap().retain(|i| i.id != id);
            Ok(())
        }
    }

    fn item(path: &str, lang: &str) -> CatalogItem {
        CatalogItem {
            item_type: ItemType::Movie,
            external_id: "1".into(),
            title: "Example".into(),
            year: Some(2020),
            season: None,
            episode: None,
            video_path: path.into(),
            missing_languages: vec![lang.into()],
            is_anime: false,
            tvdb_id: None,
        }
    }

    #[tokio::test]
    async fn scan_inserts_new_items_and_skips_known_ones() {
        let catalog: Arc<dyn CatalogClient> = Arc::new(StubCatalog(vec![item("/movies/a.mkv", "hu")]));
        let repo: Arc<dyn WantedRepository> = Arc::new(InMemoryWanted::default());
        let scanner = WantedScanner::new(vec![catalog], repo.clone());

        let first = scanner.scan().await.unwrap();
        assert_eq!(first.inserted, 1);

        let second = scanner.scan().await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.already_known, 1);
    }
}
