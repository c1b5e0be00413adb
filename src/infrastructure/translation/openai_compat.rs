//! Generic OpenAI-compatible chat-completions backend, for users who
//! point sublarr at a hosted model instead of a local Ollama instance.
//! Same batching/glossary contract as [`super::backend_trait::TranslationBackend`],
//! request shape grounded on `OllamaClient`'s HTTP-call pattern.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::TranslationError;

use super::backend_trait::{ConfigField, ConfigFieldKind, TranslationBackend};

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct OpenAiCompatBackend {
    base_url: String,
    api_key: String,
    model: String,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl OpenAiCompatBackend {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
            timeout: Duration::from_secs(120),
        }
    }

    fn build_prompt(source_lang: &str, target_lang: &str, glossary: &[(String, String)], numbered_lines: &str) -> String {
        let glossary_block = if glossary.is_empty() {
            String::new()
        } else {
            let entries = glossary
                .iter()
                .map(|(term, repl)| format!("- \"{}\" -> \"{}\"", term, repl))
                .collect::<Vec<_>>()
                .join("\n");
            format!("\n\nMandatory glossary substitutions:\n{}", entries)
        };

        format!(
            "Translate the following numbered subtitle lines from {} to {}. \
             Keep the [N] numbering. Output only the translations.{}\n\n{}",
            source_lang, target_lang, glossary_block, numbered_lines
        )
    }
}

#[async_trait]
impl TranslationBackend for OpenAiCompatBackend {
    fn name(&self) -> &'static str {
        "openai_compat"
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        vec![
            ConfigField { key: "base_url", label: "API base URL", kind: ConfigFieldKind::Text, required: true },
            ConfigField { key: "api_key", label: "API key", kind: ConfigFieldKind::Password, required: true },
            ConfigField { key: "model", label: "Model name", kind: ConfigFieldKind::Text, required: true },
        ]
    }

    async fn translate_batch(
        &self,
        numbered_lines: &str,
        source_lang: &str,
        target_lang: &str,
        glossary: &[(String, String)],
    ) -> Result<String, TranslationError> {
        let prompt = Self::build_prompt(source_lang, target_lang, glossary, numbered_lines);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage { role: "user".to_string(), content: prompt }],
            temperature: 0.3,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::TranslationFailed(format!("{} returned {}: {}", self.base_url, status, body)));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| TranslationError::ParseError(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| TranslationError::ParseError("empty choices array".to_string()))
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        self.http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_prompt_with_glossary() {
        let prompt = OpenAiCompatBackend::build_prompt(
            "English",
            "Hungarian",
            &[("Joey".to_string(), "Joey".to_string())],
            "[1] Hello",
        );
        assert!(prompt.contains("Joey"));
        assert!(prompt.contains("[1] Hello"));
    }
}
