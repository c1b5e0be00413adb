//! Vendor text-translation backend with native glossary support
//! (DeepL-style: glossaries are created server-side and referenced by
//! id on subsequent requests). Glossary objects are cached locally,
//! keyed by `(source_lang, target_lang, content_hash)`, so the same
//! series/language-profile glossary is uploaded once rather than on
//! every batch.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::shared::error::TranslationError;

use super::backend_trait::{ConfigField, ConfigFieldKind, TranslationBackend};

#[derive(Debug, Serialize)]
struct CreateGlossaryRequest {
    source_lang: String,
    target_lang: String,
    entries: Vec<GlossaryEntryWire>,
}

#[derive(Debug, Serialize)]
struct GlossaryEntryWire {
    source: String,
    target: String,
}

#[derive(Debug, Deserialize)]
struct CreateGlossaryResponse {
    glossary_id: String,
}

#[derive(Debug, Serialize)]
struct TranslateRequest {
    text: Vec<String>,
    source_lang: String,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    glossary_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    text: String,
}

type GlossaryKey = (String, String, u64);

pub struct GlossaryNativeBackend {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
    glossary_cache: Mutex<HashMap<GlossaryKey, String>>,
}

impl GlossaryNativeBackend {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("failed to build HTTP client"),
            glossary_cache: Mutex::new(HashMap::new()),
        }
    }

    fn hash_glossary(glossary: &[(String, String)]) -> u64 {
        let mut hasher = DefaultHasher::new();
        for (term, replacement) in glossary {
            term.hash(&mut hasher);
            replacement.hash(&mut hasher);
        }
        hasher.finish()
    }

    async fn glossary_id_for(
        &self,
        source_lang: &str,
        target_lang: &str,
        glossary: &[(String, String)],
    ) -> Result<Option<String>, TranslationError> {
        if glossary.is_empty() {
            return Ok(None);
        }

        let key = (source_lang.to_string(), target_lang.to_string(), Self::hash_glossary(glossary));
        if let Some(id) = self.glossary_cache.lock().await.get(&key) {
            return Ok(Some(id.clone()));
        }

        let request = CreateGlossaryRequest {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            entries: glossary
                .iter()
                .map(|(s, t)| GlossaryEntryWire { source: s.clone(), target: t.clone() })
                .collect(),
        };

        let response = self
            .http_client
            .post(format!("{}/v2/glossaries", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslationError::TranslationFailed(format!(
                "glossary creation returned {}",
                response.status()
            )));
        }

        let created: CreateGlossaryResponse = response.json().await.map_err(|e| TranslationError::ParseError(e.to_string()))?;
        self.glossary_cache.lock().await.insert(key, created.glossary_id.clone());
        Ok(Some(created.glossary_id))
    }
}

#[async_trait]
impl TranslationBackend for GlossaryNativeBackend {
    fn name(&self) -> &'static str {
        "glossary_native"
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        vec![
            ConfigField { key: "base_url", label: "API base URL", kind: ConfigFieldKind::Text, required: true },
            ConfigField { key: "api_key", label: "API key", kind: ConfigFieldKind::Password, required: true },
        ]
    }

    async fn translate_batch(
        &self,
        numbered_lines: &str,
        source_lang: &str,
        target_lang: &str,
        glossary: &[(String, String)],
    ) -> Result<String, TranslationError> {
        let glossary_id = self.glossary_id_for(source_lang, target_lang, glossary).await?;
        let lines: Vec<String> = numbered_lines.lines().map(|l| l.to_string()).collect();

        let request = TranslateRequest {
            text: lines,
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            glossary_id,
        };

        let response = self
            .http_client
            .post(format!("{}/v2/translate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslationError::TranslationFailed(format!("translate returned {}", response.status())));
        }

        let parsed: TranslateResponse = response.json().await.map_err(|e| TranslationError::ParseError(e.to_string()))?;
        Ok(parsed.translations.into_iter().map(|t| t.text).collect::<Vec<_>>().join("\n"))
    }

    async fn is_available(&self) -> bool {
        self.http_client
            .get(format!("{}/v2/usage", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(std::time::Duration::from_secs(5))
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
    fn same_glossary_hashes_equal() {
        let a = vec![("Joey".to_string(), "Joey".to_string())];
        let b = vec![("Joey".to_string(), "Joey".to_string())];
        assert_eq!(GlossaryNativeBackend::hash_glossary(&a), GlossaryNativeBackend::hash_glossary(&b));
    }

    #[test]
    fn different_glossary_hashes_differ() {
        let a = vec![("Joey".to_string(), "Joey".to_string())];
        let b = vec![("Ross".to_string(), "Ross".to_string())];
        assert_ne!(GlossaryNativeBackend::hash_glossary(&a), GlossaryNativeBackend::hash_glossary(&b));
    }
}
