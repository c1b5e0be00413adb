//! Ollama LLM Translation Module
//!
//! Provides subtitle translation using Ollama's local LLM API.
//! Translates transcribed subtitles from one language to another.

mod client;

pub use client::*;
