//! Application Layer
//!
//! Thin use cases that sit between the HTTP surface and the
//! infrastructure-level pipeline (wanted scanner, search loop,
//! translator engine). Each one resolves/creates the entity the
//! request refers to and delegates the actual work.

pub mod use_cases;

pub use use_cases::{BatchSearchWantedUseCase, ScanWantedUseCase, SearchWantedItemUseCase, TranslateFileUseCase};
