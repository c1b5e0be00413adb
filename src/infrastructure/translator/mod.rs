//! Subtitle translation engine -- ASS/SSA handling, embedded-stream
//! selection, language tag normalization, SRT I/O and the orchestrating
//! decision tree.

pub mod ass;
pub mod engine;
pub mod language_tags;
pub mod srt;
pub mod stream_select;

pub use engine::{TranslatorEngine, TranslatorOutcome};
