//! sublarr library
//!
//! Subtitle acquisition, translation and transcription engine. Exposes
//! core modules for integration tests and as a library.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod shared;

