//! Manual/API trigger to run the search+translate pipeline for a single
//! already-known wanted item, fronting
//! [`SearchLoop::run_one`](crate::infrastructure::wanted::SearchLoop).

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::repositories::WantedRepository;
use crate::infrastructure::translator::engine::TranslatorOutcome;
use crate::infrastructure::wanted::SearchLoop;
use crate::shared::error::WantedError;

pub struct SearchWantedItemUseCase {
    wanted_repository: Arc<dyn WantedRepository>,
    search_loop: Arc<SearchLoop>,
}

impl SearchWantedItemUseCase {
    pub fn new(wanted_repository: Arc<dyn WantedRepository>, search_loop: Arc<SearchLoop>) -> Self {
        Self { wanted_repository, search_loop }
    }

    pub async fn execute(&self, wanted_item_id: Uuid) -> Result<TranslatorOutcome, WantedError> {
        let item = self
            .wanted_repository
            .find_by_id(wanted_item_id)
            .await?
            .ok_or_else(|| WantedError::NotFound(wanted_item_id.to_string()))?;

        self.search_loop.run_one(item).await
    }
}
