//! Entry point to force a subtitle search/translate pass for a
//! specific video file and language, creating the wanted-item row if
//! one doesn't already exist. This is the path a manual "get subtitle
//! now" request takes, as opposed to the scheduler discovering the item
//! via [`WantedScanner`](crate::infrastructure::wanted::WantedScanner).

use std::sync::Arc;

use crate::domain::entities::{ItemType, SubtitleKind, WantedItem};
use crate::domain::repositories::WantedRepository;
use crate::infrastructure::translator::engine::TranslatorOutcome;
use crate::infrastructure::wanted::SearchLoop;
use crate::shared::error::WantedError;

pub struct TranslateFileUseCase {
    wanted_repository: Arc<dyn WantedRepository>,
    search_loop: Arc<SearchLoop>,
}

impl TranslateFileUseCase {
    pub fn new(wanted_repository: Arc<dyn WantedRepository>, search_loop: Arc<SearchLoop>) -> Self {
        Self { wanted_repository, search_loop }
    }

    pub async fn execute(
        &self,
        item_type: ItemType,
        video_path: String,
        language: String,
        subtitle_kind: SubtitleKind,
    ) -> Result<TranslatorOutcome, WantedError> {
        let item = match self
            .wanted_repository
            .find_by_path_and_language(&video_path, &language)
            .await?
        {
            Some(existing) => existing,
            None => {
                let created = WantedItem::new(item_type, video_path, language, subtitle_kind);
                self.wanted_repository.insert(&created).await?;
                created
            }
        };

        self.search_loop.run_one(item).await
    }
}
