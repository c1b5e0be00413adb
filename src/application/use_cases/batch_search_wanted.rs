//! Scheduled/manual trigger to run the search+translate pipeline over
//! every pending wanted item, bounded by `max_items`, fronting
//! [`SearchLoop::run_batch`](crate::infrastructure::wanted::SearchLoop).

use std::sync::Arc;

use crate::domain::entities::WantedStatus;
use crate::domain::repositories::WantedRepository;
use crate::infrastructure::translator::engine::TranslatorOutcome;
use crate::infrastructure::wanted::SearchLoop;
use crate::shared::error::WantedError;

pub struct BatchSearchWantedUseCase {
    wanted_repository: Arc<dyn WantedRepository>,
    search_loop: Arc<SearchLoop>,
}

impl BatchSearchWantedUseCase {
    pub fn new(wanted_repository: Arc<dyn WantedRepository>, search_loop: Arc<SearchLoop>) -> Self {
        Self { wanted_repository, search_loop }
    }

    pub async fn execute(&self, max_items: usize) -> Result<Vec<Result<TranslatorOutcome, WantedError>>, WantedError> {
        let mut items = self.wanted_repository.list_by_status(WantedStatus::Pending).await?;
        items.extend(self.wanted_repository.list_by_status(WantedStatus::NotFound).await?);
        Ok(self.search_loop.run_batch(items, max_items).await)
    }
}
