//! Manual trigger for a wanted-item catalog scan, fronting
//! [`WantedScanner`](crate::infrastructure::wanted::WantedScanner).

use std::sync::Arc;

use crate::infrastructure::wanted::{ScanSummary, WantedScanner};
use crate::shared::error::WantedError;

pub struct ScanWantedUseCase {
    scanner: Arc<WantedScanner>,
}

impl ScanWantedUseCase {
    pub fn new(scanner: Arc<WantedScanner>) -> Self {
        Self { scanner }
    }

    pub async fn execute(&self) -> Result<ScanSummary, WantedError> {
        self.scanner.scan().await
    }
}
