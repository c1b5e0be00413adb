//! Wanted-item scanner and search loop.

pub mod catalog_client;
pub mod media_manager_a_client;
pub mod media_manager_b_client;
pub mod scanner;
pub mod search_loop;

pub use catalog_client::{CatalogClient, CatalogItem};
pub use media_manager_a_client::MediaManagerAClient;
pub use media_manager_b_client::MediaManagerBClient;
pub use scanner::{ScanSummary, WantedScanner};
pub use search_loop::SearchLoop;
