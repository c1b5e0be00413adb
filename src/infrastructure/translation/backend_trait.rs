//! Translation-backend contract. Every backend (local-LLM, OpenAI
//! compatible, glossary-native) implements this trait and owns its own
//! [`CircuitBreakerState`](crate::domain::CircuitBreakerState).

use async_trait::async_trait;

use crate::shared::error::TranslationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFieldKind {
    Text,
    Password,
    Number,
}

#[derive(Debug, Clone)]
pub struct ConfigField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ConfigFieldKind,
    pub required: bool,
}

#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Stable registry name, e.g. `"local_llm"`, `"openai_compat"`.
    fn name(&self) -> &'static str;

    /// Config fields this backend needs (API URL, key, model name...),
    /// used to render its settings form dynamically.
    fn config_fields(&self) -> Vec<ConfigField>;

    /// Translate a batch of numbered lines from `source_lang` to
    /// `target_lang`. `glossary` holds forced term substitutions that
    /// must survive translation verbatim.
    async fn translate_batch(
        &self,
        numbered_lines: &str,
        source_lang: &str,
        target_lang: &str,
        glossary: &[(String, String)],
    ) -> Result<String, TranslationError>;

    async fn is_available(&self) -> bool;

    /// Maximum number of lines this backend accepts in a single
    /// `translate_batch` call. The manager splits larger inputs into
    /// chunks of at most this size.
    fn max_batch_size(&self) -> usize {
        50
    }

    /// Retry budget applied by the manager on top of a failed or
    /// hallucinated batch/line translation.
    fn max_retries(&self) -> u32 {
        3
    }

    fn supports_glossary(&self) -> bool {
        true
    }

    fn supports_batching(&self) -> bool {
        true
    }
}
