//! Webhook dispatcher: POSTs a JSON envelope to each configured
//! URL, optionally HMAC-signing the body, retrying on 429/5xx with
//! backoff. A webhook auto-skips after 10 consecutive failures without
//! being disabled in config, so restoring the endpoint resumes delivery
//! on its own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::{error, warn};

type HmacSha256 = Hmac<Sha256>;

const CONSECUTIVE_FAILURE_SKIP_THRESHOLD: u32 = 10;
const RETRY_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub name: String,
    pub event_binding: String,
    pub url: String,
    pub secret: Option<String>,
    pub retry_count: u32,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct WebhookEnvelope<'a> {
    event_name: &'a str,
    version: u32,
    timestamp: chrono::DateTime<Utc>,
    data: &'a HashMap<String, Value>,
}

struct WebhookState {
    config: WebhookConfig,
    consecutive_failures: AtomicU32,
}

pub struct WebhookDispatcher {
    webhooks: Vec<WebhookState>,
    client: reqwest::Client,
}

impl WebhookDispatcher {
    pub fn new(webhooks: Vec<WebhookConfig>) -> Self {
        Self {
            webhooks: webhooks.into_iter().map(|config| WebhookState { config, consecutive_failures: AtomicU32::new(0) }).collect(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn dispatch(&self, event_name: &str, payload: &HashMap<String, Value>) {
        for state in &self.webhooks {
            if state.config.event_binding != event_name {
                continue;
            }
            if state.consecutive_failures.load(Ordering::Relaxed) >= CONSECUTIVE_FAILURE_SKIP_THRESHOLD {
                warn!(webhook = %state.config.name, "webhook auto-skipped after consecutive failures");
                continue;
            }

            self.deliver(state, event_name, payload).await;
        }
    }

    async fn deliver(&self, state: &WebhookState, event_name: &str, payload: &HashMap<String, Value>) {
        let envelope = WebhookEnvelope { event_name, version: 1, timestamp: Utc::now(), data: payload };
        let body = match serde_json::to_vec(&envelope) {
            Ok(b) => b,
            Err(e) => {
                error!(webhook = %state.config.name, error = %e, "failed to serialize webhook envelope");
                return;
            }
        };

        let mut backoff = backoff::ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(30),
            max_elapsed_time: Some(state.config.timeout * (state.config.retry_count + 1)),
            ..Default::default()
        };

        for attempt in 0..=state.config.retry_count {
            let mut request = self.client.post(&state.config.url).timeout(state.config.timeout).header("Content-Type", "application/json").body(body.clone());

            if let Some(secret) = &state.config.secret {
                if let Ok(signature) = sign(secret, &body) {
                    request = request.header("X-Sublarr-Signature", format!("sha256={}", signature));
                }
            }

            match request.send().await {
                Ok(resp) if resp.status().is_success() => {
                    state.consecutive_failures.store(0, Ordering::Relaxed);
                    return;
                }
                Ok(resp) if RETRY_STATUSES.contains(&resp.status().as_u16()) && attempt < state.config.retry_count => {
                    let wait = backoff::backoff::Backoff::next_backoff(&mut backoff).unwrap_or(Duration::from_secs(1));
                    tokio::time::sleep(wait).await;
                }
                Ok(resp) => {
                    warn!(webhook = %state.config.name, status = %resp.status(), "webhook delivery failed");
                    state.consecutive_failures.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                Err(e) if attempt < state.config.retry_count => {
                    let wait = backoff::backoff::Backoff::next_backoff(&mut backoff).unwrap_or(Duration::from_secs(1));
                    warn!(webhook = %state.config.name, error = %e, "webhook request errored, retrying");
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    error!(webhook = %state.config.name, error = %e, "webhook delivery exhausted retries");
                    state.consecutive_failures.fetch_add(1, Ordering::Relaxed);
                    return;
                }
            }
        }
    }
}

fn sign(secret: &str, body: &[u8]) -> Result<String, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_secret_and_body_sign_identically() {
        let a = sign("shh", b"hello").unwrap();
        let b = sign("shh", b"hello").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_secrets_sign_differently() {
        let a = sign("one", b"hello").unwrap();
        let b = sign("two", b"hello").unwrap();
        assert_ne!(a, b);
    }
}
