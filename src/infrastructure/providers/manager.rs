//! The provider manager -- enumerates, orders, invokes, scores,
//! caches, blacklists and circuit-breaks providers. Grounded on
//! the teacher's registry-of-collaborators pattern, generalized from a
//! single-backend lookup to the per-call fan-out this spec needs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, warn};

use crate::domain::entities::{
    BlacklistEntry, CircuitBreakerState, ItemType, ProviderCacheEntry, ScoringCategory, ScoringWeights,
    SubtitleFormat, SubtitleResult, VideoQuery,
};
use crate::domain::repositories::{BlacklistRepository, ProviderCacheRepository};
use crate::shared::error::ProviderError;

use super::http_session::HttpSession;
use super::provider_trait::SubtitleProvider;

const CACHE_TTL: chrono::Duration = chrono::Duration::minutes(15);
const BREAKER_FAILURE_THRESHOLD: u32 = 5;
const BREAKER_COOLDOWN: chrono::Duration = chrono::Duration::minutes(5);

struct Registration {
    provider: Arc<dyn SubtitleProvider>,
    session: HttpSession,
}

#[derive(Default)]
struct AttemptCounter {
    attempts: AtomicU32,
    successes: AtomicU32,
}

impl AttemptCounter {
    fn record(&self, success: bool) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successes.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn success_rate(&self) -> f64 {
        let attempts = self.attempts.load(Ordering::Relaxed);
        if attempts == 0 {
            return 0.5;
        }
        self.successes.load(Ordering::Relaxed) as f64 / attempts as f64
    }
}

pub struct ProviderManager {
    providers: HashMap<&'static str, Registration>,
    breakers: HashMap<&'static str, Mutex<CircuitBreakerState>>,
    attempts: HashMap<&'static str, AttemptCounter>,
    enabled: RwLock<Vec<&'static str>>,
    priority: RwLock<Vec<&'static str>>,
    auto_prioritise: RwLock<bool>,
    weights: RwLock<ScoringWeights>,
    cache: Arc<dyn ProviderCacheRepository>,
    blacklist: Arc<dyn BlacklistRepository>,
}

impl ProviderManager {
    pub fn new(cache: Arc<dyn ProviderCacheRepository>, blacklist: Arc<dyn BlacklistRepository>) -> Self {
        Self {
            providers: HashMap::new(),
            breakers: HashMap::new(),
            attempts: HashMap::new(),
            enabled: RwLock::new(Vec::new()),
            priority: RwLock::new(Vec::new()),
            auto_prioritise: RwLock::new(false),
            weights: RwLock::new(ScoringWeights::default()),
            cache,
            blacklist,
        }
    }

    /// Registers a provider, builds its HTTP session from its declared
    /// rate limit/timeout/retry policy, and runs its `initialize` hook.
    /// Newly-registered providers are appended to both the enabled and
    /// priority lists.
    pub async fn register(&mut self, provider: Arc<dyn SubtitleProvider>) -> Result<(), ProviderError> {
        let name = provider.name();
        let session = HttpSession::new(provider.rate_limit(), provider.timeout(), provider.max_retries());
        provider.initialize(&session).await?;

        self.providers.insert(name, Registration { provider, session });
        self.breakers.insert(name, Mutex::new(CircuitBreakerState::new(BREAKER_FAILURE_THRESHOLD, BREAKER_COOLDOWN)));
        self.attempts.insert(name, AttemptCounter::default());
        self.enabled.write().await.push(name);
        self.priority.write().await.push(name);
        Ok(())
    }

    pub async fn set_enabled(&self, names: Vec<&'static str>) {
        *self.enabled.write().await = names;
    }

    pub async fn set_priority(&self, names: Vec<&'static str>) {
        *self.priority.write().await = names;
    }

    pub async fn set_auto_prioritise(&self, on: bool) {
        *self.auto_prioritise.write().await = on;
    }

    pub async fn set_weights(&self, weights: ScoringWeights) {
        *self.weights.write().await = weights;
    }

    async fn ordered_providers(&self) -> Vec<&'static str> {
        let enabled = self.enabled.read().await.clone();
        if !*self.auto_prioritise.read().await {
            let priority = self.priority.read().await.clone();
            let mut ordered: Vec<&'static str> = priority.into_iter().filter(|n| enabled.contains(n)).collect();
            for name in &enabled {
                if !ordered.contains(name) {
                    ordered.push(name);
                }
            }
            return ordered;
        }

        let mut ranked: Vec<&'static str> = enabled;
        ranked.sort_by(|a, b| {
            let rate_a = self.attempts.get(a).map(|c| c.success_rate()).unwrap_or(0.5);
            let rate_b = self.attempts.get(b).map(|c| c.success_rate()).unwrap_or(0.5);
            rate_b.partial_cmp(&rate_a).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.cmp(b))
        });
        ranked
    }

    /// Searches every registered provider in priority order, merging results.
    pub async fn search(
        &self,
        query: &VideoQuery,
        format_filter: Option<SubtitleFormat>,
    ) -> Result<Vec<SubtitleResult>, ProviderError> {
        let cache_key = cache_key_for(query, format_filter);
        let weights = self.weights.read().await.clone();
        let category = match query.item_type {
            ItemType::Episode => ScoringCategory::Episode,
            ItemType::Movie => ScoringCategory::Movie,
        };

        let mut all_results = Vec::new();
        for name in self.ordered_providers().await {
            let Some(registration) = self.providers.get(name) else { continue };

            {
                let mut breaker = self.breakers.get(name).unwrap().lock().await;
                if !breaker.allow_request(Utc::now()) {
                    continue;
                }
            }

            let results = match self.cache.get(&cache_key, name).await {
                Ok(Some(entry)) if !entry.is_expired(Utc::now()) => entry.results,
                _ => match tokio::time::timeout(
                    registration.provider.timeout(),
                    registration.provider.search(&registration.session, query),
                )
                .await
                {
                    Ok(Ok(results)) => {
                        self.breakers.get(name).unwrap().lock().await.record_success();
                        self.attempts.get(name).unwrap().record(true);
                        results
                    }
                    Ok(Err(e)) => {
                        error!(provider = name, error = %e, "provider search failed");
                        self.breakers.get(name).unwrap().lock().await.record_failure(Utc::now());
                        self.attempts.get(name).unwrap().record(false);
                        Vec::new()
                    }
                    Err(_) => {
                        warn!(provider = name, "provider search timed out");
                        self.breakers.get(name).unwrap().lock().await.record_failure(Utc::now());
                        self.attempts.get(name).unwrap().record(false);
                        Vec::new()
                    }
                },
            };

            let mut kept = Vec::with_capacity(results.len());
            for mut result in results {
                if self.blacklist.is_blacklisted(name, &result.subtitle_id).await.unwrap_or(false) {
                    continue;
                }
                if result.language != query.wanted_language {
                    continue;
                }
                if let Some(filter) = format_filter {
                    if result.format != filter {
                        continue;
                    }
                }
                result.score = score(&result, &weights, category);
                kept.push(result);
            }

            let entry = ProviderCacheEntry {
                cache_key: cache_key.clone(),
                provider_name: name.to_string(),
                results: kept.clone(),
                cached_at: Utc::now(),
                expires_at: Utc::now() + CACHE_TTL,
            };
            if let Err(e) = self.cache.put(&entry).await {
                warn!(provider = name, error = %e, "failed to cache provider results");
            }

            all_results.extend(kept);
        }

        let priority_list = self.priority.read().await.clone();
        let priority_rank = |name: &str| priority_list.iter().position(|p| *p == name).unwrap_or(priority_list.len());

        all_results.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| priority_rank(&a.provider_name).cmp(&priority_rank(&b.provider_name)))
                .then_with(|| format_rank(a.format).cmp(&format_rank(b.format)))
        });
        Ok(all_results)
    }

    /// Searches, scores and downloads the best-ranked candidate.
    pub async fn search_and_download_best(
        &self,
        query: &VideoQuery,
        format_filter: Option<SubtitleFormat>,
    ) -> Result<Option<SubtitleResult>, ProviderError> {
        let candidates = self.search(query, format_filter).await?;

        for mut candidate in candidates {
            if self.blacklist.is_blacklisted(&candidate.provider_name, &candidate.subtitle_id).await.unwrap_or(false) {
                continue;
            }

            let Some(registration) = self.providers.get(candidate.provider_name.as_str()) else { continue };
            match registration.provider.download(&registration.session, &candidate).await {
                Ok(raw) => {
                    let kind = super::archive::detect(&candidate.filename, &raw);
                    let bytes = super::archive::extract_subtitle(&raw, kind)?;
                    if kind != super::archive::ArchiveKind::None {
                        candidate.format = reclassify_format(&candidate.filename, &bytes);
                    }
                    candidate.content = Some(bytes);
                    return Ok(Some(candidate));
                }
                Err(e) => {
                    warn!(provider = %candidate.provider_name, subtitle_id = %candidate.subtitle_id, error = %e, "download failed, blacklisting");
                    let entry = BlacklistEntry {
                        provider_name: candidate.provider_name.clone(),
                        subtitle_id: candidate.subtitle_id.clone(),
                        reason: e.to_string(),
                        created_at: Utc::now(),
                    };
                    let _ = self.blacklist.add(&entry).await;
                }
            }
        }

        Ok(None)
    }

    pub async fn health_check(&self) -> HashMap<&'static str, (bool, String)> {
        let mut statuses = HashMap::new();
        for (name, registration) in &self.providers {
            statuses.insert(*name, registration.provider.health_check(&registration.session).await);
        }
        statuses
    }
}

fn cache_key_for(query: &VideoQuery, format_filter: Option<SubtitleFormat>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{:?}", query.item_type));
    hasher.update(query.title.as_bytes());
    hasher.update(format!("{:?}", query.year));
    hasher.update(format!("{:?}", query.season));
    hasher.update(format!("{:?}", query.episode));
    hasher.update(query.release_group.as_deref().unwrap_or(""));
    hasher.update(query.wanted_language.as_bytes());
    hasher.update(format!("{:?}", format_filter));
    hex::encode(hasher.finalize())
}

fn score(result: &SubtitleResult, weights: &ScoringWeights, category: ScoringCategory) -> i32 {
    let mut total: i32 = result.matches.iter().map(|kind| weights.weight_for(category, *kind)).sum();
    if matches!(result.format, SubtitleFormat::Ass | SubtitleFormat::Ssa) {
        total += weights.format_bonus;
    }
    total += weights.provider_modifier(&result.provider_name);
    total += result.uploader_trust_bonus;
    total
}

fn format_rank(format: SubtitleFormat) -> u8 {
    match format {
        SubtitleFormat::Ass => 0,
        SubtitleFormat::Ssa => 1,
        SubtitleFormat::Srt => 2,
        SubtitleFormat::Vtt => 3,
        SubtitleFormat::Unknown => 4,
    }
}

fn reclassify_format(filename: &str, bytes: &[u8]) -> SubtitleFormat {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".ass") {
        return SubtitleFormat::Ass;
    }
    if lower.ends_with(".ssa") {
        return SubtitleFormat::Ssa;
    }
    if lower.ends_with(".vtt") {
        return SubtitleFormat::Vtt;
    }
    if lower.ends_with(".srt") {
        return SubtitleFormat::Srt;
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(32)]);
    if head.contains("[Script Info]") {
        SubtitleFormat::Ass
    } else {
        SubtitleFormat::Srt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn scores_sum_matched_weights_plus_bonuses() {
        let weights = ScoringWeights::default();
        let mut result = SubtitleResult::new("opensubtitles", "1", "en");
        result.matches = HashSet::from([crate::domain::entities::MatchKind::Hash, crate::domain::entities::MatchKind::Year]);
        result.format = SubtitleFormat::Ass;
        result.uploader_trust_bonus = 5;
        let s = score(&result, &weights, ScoringCategory::Episode);
        assert_eq!(s, 359 + 90 + 50 + 5);
    }

    #[test]
    fn format_rank_prefers_ass_over_srt() {
        assert!(format_rank(SubtitleFormat::Ass) < format_rank(SubtitleFormat::Srt));
    }
}
