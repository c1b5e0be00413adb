//! Registry of [`TranslationBackend`]s plus the single active backend
//! selection, each guarded by its own circuit breaker (the same pattern
//! reused here rather than duplicated for provider registries).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::domain::entities::CircuitBreakerState;
use crate::shared::error::TranslationError;

use super::backend_trait::TranslationBackend;

pub struct TranslationManager {
    backends: HashMap<&'static str, Arc<dyn TranslationBackend>>,
    breakers: HashMap<&'static str, Mutex<CircuitBreakerState>>,
    active: RwLock<Option<&'static str>>,
}

impl TranslationManager {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            breakers: HashMap::new(),
            active: RwLock::new(None),
        }
    }

    pub fn register(&mut self, backend: Arc<dyn TranslationBackend>) {
        let name = backend.name();
        self.breakers.insert(name, Mutex::new(CircuitBreakerState::new(5, chrono::Duration::seconds(60))));
        self.backends.insert(name, backend);
    }

    pub async fn set_active(&self, name: &'static str) -> Result<(), TranslationError> {
        if !self.backends.contains_key(name) {
            return Err(TranslationError::NotRegistered(name.to_string()));
        }
        *self.active.write().await = Some(name);
        Ok(())
    }

    async fn active_backend(&self) -> Result<Arc<dyn TranslationBackend>, TranslationError> {
        let name = self.active.read().await.ok_or(TranslationError::NoActiveBackend)?;
        self.backends
            .get(name)
            .cloned()
            .ok_or_else(|| TranslationError::NotRegistered(name.to_string()))
    }

    /// Translates a newline-separated block of text from `source_lang`
    /// to `target_lang` via the active backend.
    ///
    /// The input is split into chunks of at most the backend's
    /// `max_batch_size`. Each chunk is translated with retries (capped
    /// by the backend's `max_retries`, exponential backoff between
    /// attempts) whenever the backend call fails or the result trips
    /// the hallucination guard -- CJK output for a non-CJK target,
    /// which usually means the model ignored the prompt and echoed
    /// training data instead of translating. A chunk that still can't
    /// be translated falls back to per-line calls under the same retry
    /// discipline; lines that still fail keep their original text. The
    /// overall call only errors if more than half the lines ended up
    /// degraded this way.
    pub async fn translate_batch(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        glossary: &[(String, String)],
    ) -> Result<String, TranslationError> {
        let backend = self.active_backend().await?;
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Ok(String::new());
        }

        let max_batch_size = backend.max_batch_size().max(1);
        let mut out = Vec::with_capacity(lines.len());
        let mut degraded = 0usize;

        for chunk in lines.chunks(max_batch_size) {
            match self.translate_chunk(&backend, chunk, source_lang, target_lang, glossary).await {
                Some(translated) => out.extend(translated),
                None => {
                    for line in chunk {
                        let single = std::slice::from_ref(line);
                        match self.translate_chunk(&backend, single, source_lang, target_lang, glossary).await {
                            Some(mut one) => out.push(one.pop().unwrap_or_else(|| (*line).to_string())),
                            None => {
                                degraded += 1;
                                out.push((*line).to_string());
                            }
                        }
                    }
                }
            }
        }

        let total = lines.len();
        if degraded * 2 > total {
            return Err(TranslationError::TranslationFailed(format!(
                "backend '{}' degraded {} of {} lines, past the 50% threshold",
                backend.name(),
                degraded,
                total
            )));
        }
        if degraded > 0 {
            warn!(backend = backend.name(), degraded, total, "translation completed with degraded lines");
        }
        Ok(out.join("\n"))
    }

    /// Translates one chunk of lines, retrying on backend failure or a
    /// hallucinated (wrong-script) response. Returns `None` once the
    /// retry budget is exhausted so the caller can fall back to
    /// per-line translation.
    async fn translate_chunk(
        &self,
        backend: &Arc<dyn TranslationBackend>,
        chunk: &[&str],
        source_lang: &str,
        target_lang: &str,
        glossary: &[(String, String)],
    ) -> Option<Vec<String>> {
        let numbered = number_lines(chunk, glossary);
        let max_retries = backend.max_retries();
        let mut backoff_state = backoff::ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(20),
            max_elapsed_time: None,
            ..Default::default()
        };

        for attempt in 0..=max_retries {
            if let Ok(raw) = self.call_backend(backend, &numbered, source_lang, target_lang, glossary).await {
                let parsed = parse_numbered_response(&raw, chunk.len());
                if !hallucinates_cjk(&parsed, target_lang) {
                    return Some(parsed);
                }
                warn!(backend = backend.name(), attempt, target_lang, "translation chunk hallucinated CJK output, retrying");
            }
            if attempt < max_retries {
                let wait = backoff::backoff::Backoff::next_backoff(&mut backoff_state).unwrap_or(Duration::from_secs(1));
                tokio::time::sleep(wait).await;
            }
        }
        None
    }

    /// One raw call to the active backend, gated and scored by its
    /// circuit breaker.
    async fn call_backend(
        &self,
        backend: &Arc<dyn TranslationBackend>,
        numbered_lines: &str,
        source_lang: &str,
        target_lang: &str,
        glossary: &[(String, String)],
    ) -> Result<String, TranslationError> {
        let name = backend.name();

        if let Some(breaker) = self.breakers.get(name) {
            let mut guard = breaker.lock().await;
            if !guard.allow_request(chrono::Utc::now()) {
                return Err(TranslationError::ServiceUnavailable(format!("circuit open for backend '{}'", name)));
            }
        }

        match backend.translate_batch(numbered_lines, source_lang, target_lang, glossary).await {
            Ok(result) => {
                if let Some(breaker) = self.breakers.get(name) {
                    breaker.lock().await.record_success();
                }
                Ok(result)
            }
            Err(e) => {
                if let Some(breaker) = self.breakers.get(name) {
                    breaker.lock().await.record_failure(chrono::Utc::now());
                }
                warn!(backend = name, error = %e, "translation backend call failed");
                Err(e)
            }
        }
    }

    /// Translates whisper transcription segments in context-preserving
    /// batches. Numbering and retries are handled by `translate_batch`
    /// itself; this just reassembles its line-for-line output back onto
    /// the original segment timestamps.
    pub async fn translate_segments(
        &self,
        segments: Vec<crate::infrastructure::external::whisper::TranscriptionSegment>,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<crate::infrastructure::external::whisper::TranscriptionSegment>, TranslationError> {
        const BATCH_SIZE: usize = 10;
        let mut out = Vec::with_capacity(segments.len());

        for chunk in segments.chunks(BATCH_SIZE) {
            let joined = chunk.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join("\n");
            let translated = self.translate_batch(&joined, source_lang, target_lang, &[]).await?;
            let texts: Vec<&str> = translated.lines().collect();

            for (i, segment) in chunk.iter().enumerate() {
                out.push(crate::infrastructure::external::whisper::TranscriptionSegment {
                    start_time: segment.start_time,
                    end_time: segment.end_time,
                    text: texts.get(i).map(|s| s.to_string()).unwrap_or_else(|| segment.text.clone()),
                });
            }
        }

        Ok(out)
    }
}

impl Default for TranslationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the numbered prompt body for a chunk: an optional glossary
/// line (capped at 15 entries) followed by each line prefixed `N: `.
fn number_lines(chunk: &[&str], glossary: &[(String, String)]) -> String {
    const GLOSSARY_CAP: usize = 15;
    let mut out = String::new();
    if !glossary.is_empty() {
        let entries = glossary
            .iter()
            .take(GLOSSARY_CAP)
            .map(|(src, tgt)| format!("{} -> {}", src, tgt))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("glossary: {}\n", entries));
    }
    for (i, line) in chunk.iter().enumerate() {
        out.push_str(&format!("{}: {}\n", i + 1, line));
    }
    out.trim_end().to_string()
}

fn parse_numbered_response(response: &str, expected_count: usize) -> Vec<String> {
    let mut results: Vec<String> = response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| strip_numbered_prefix(l).unwrap_or(l).to_string())
        .collect();

    if results.len() > expected_count && expected_count > 0 {
        let tail = results.split_off(expected_count - 1);
        results.push(tail.join(" "));
    }
    while results.len() < expected_count {
        results.push(String::new());
    }
    results.truncate(expected_count);
    results
}

/// Strips a leading `[N]`, `N:` or `N.` marker, as produced by the
/// different backend prompt styles.
fn strip_numbered_prefix(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix('[') {
        if let Some(close) = rest.find(']') {
            return Some(rest[close + 1..].trim());
        }
    }
    let digits_end = line.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let (_, rest) = line.split_at(digits_end);
    let rest = rest.strip_prefix(':').or_else(|| rest.strip_prefix('.'))?;
    Some(rest.trim())
}

/// CJK Unified Ideographs, Hiragana, Katakana and Hangul syllables --
/// the scripts a hallucinated Chinese/Japanese/Korean response would
/// show up in regardless of which of the three it is.
fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| {
        let cp = c as u32;
        (0x3040..=0x30FF).contains(&cp)
            || (0x3400..=0x4DBF).contains(&cp)
            || (0x4E00..=0x9FFF).contains(&cp)
            || (0xAC00..=0xD7A3).contains(&cp)
    })
}

fn is_cjk_language(lang: &str) -> bool {
    matches!(
        lang.to_lowercase().as_str(),
        "chinese" | "japanese" | "korean" | "zh" | "ja" | "ko" | "zho" | "jpn" | "kor"
    )
}

/// The backend manager's own guard against hallucinated output: a
/// non-CJK target language whose translated lines contain CJK text
/// almost always means the model echoed unrelated training data
/// rather than translating.
fn hallucinates_cjk(lines: &[String], target_lang: &str) -> bool {
    !is_cjk_language(target_lang) && lines.iter().any(|l| contains_cjk(l))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_active_backend_errors() {
        let manager = TranslationManager::new();
        let result = manager.translate_batch("hello", "English", "Hungarian", &[]).await;
        assert!(matches!(result, Err(TranslationError::NoActiveBackend)));
    }

    #[test]
    fn parses_numbered_lines() {
        let parsed = parse_numbered_response("[1] Szia\n[2] Vilag", 2);
        assert_eq!(parsed, vec!["Szia".to_string(), "Vilag".to_string()]);
    }

    #[test]
    fn parses_colon_and_dot_prefixes() {
        let parsed = parse_numbered_response("1: Szia\n2. Vilag", 2);
        assert_eq!(parsed, vec!["Szia".to_string(), "Vilag".to_string()]);
    }

    #[test]
    fn merges_extra_lines_into_the_last_slot() {
        let parsed = parse_numbered_response("1: Szia\n2: Vilag\nextra line", 2);
        assert_eq!(parsed, vec!["Szia".to_string(), "Vilag extra line".to_string()]);
    }

    #[test]
    fn pads_missing_lines_with_empty_strings() {
        let parsed = parse_numbered_response("1: Szia", 2);
        assert_eq!(parsed, vec!["Szia".to_string(), String::new()]);
    }

    #[test]
    fn numbers_lines_with_capped_glossary() {
        let glossary = vec![("Joey".to_string(), "Joey".to_string())];
        let prompt = number_lines(&["hello", "world"], &glossary);
        assert_eq!(prompt, "glossary: Joey -> Joey\n1: hello\n2: world");
    }

    #[test]
    fn hallucination_guard_ignores_cjk_text_in_cjk_targets() {
        let lines = vec!["你好".to_string()];
        assert!(!hallucinates_cjk(&lines, "Chinese"));
        assert!(hallucinates_cjk(&lines, "Hungarian"));
    }

    #[test]
    fn hallucination_guard_ignores_latin_text() {
        let lines = vec!["Szia vilag".to_string()];
        assert!(!hallucinates_cjk(&lines, "Hungarian"));
    }
}
