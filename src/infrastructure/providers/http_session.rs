//! Shared HTTP client for providers: per-provider rate limiting via
//! `governor` and exponential backoff retry via `backoff`, so individual
//! provider implementations never hand-roll either concern.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tracing::warn;

use crate::shared::error::ProviderError;

use super::provider_trait::RateLimit;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Retry on these HTTP statuses; anything else is treated as a
/// non-retriable failure and surfaced immediately.
const RETRY_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

pub struct HttpSession {
    client: reqwest::Client,
    limiter: Arc<Limiter>,
    timeout: Duration,
    max_retries: u32,
}

impl HttpSession {
    pub fn new(rate_limit: RateLimit, timeout: Duration, max_retries: u32) -> Self {
        let per_seconds = rate_limit.per_seconds.max(1);
        let requests = rate_limit.requests.max(1);
        let quota = Quota::with_period(Duration::from_secs(per_seconds.into()))
            .expect("nonzero period")
            .allow_burst(NonZeroU32::new(requests).expect("nonzero burst"));

        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build HTTP client"),
            limiter: Arc::new(RateLimiter::direct(quota)),
            timeout,
            max_retries,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Runs `attempt` under the rate limiter, retrying on transient
    /// statuses with exponential backoff capped by `max_retries`.
    pub async fn execute(
        &self,
        mut attempt: impl FnMut() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ProviderError> {
        let mut backoff = backoff::ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(30),
            max_elapsed_time: Some(self.timeout * (self.max_retries + 1)),
            ..Default::default()
        };

        let mut tries = 0;
        loop {
            self.limiter.until_ready().await;
            tries += 1;

            let response = attempt().send().await;
            match response {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) if RETRY_STATUSES.contains(&resp.status().as_u16()) && tries <= self.max_retries => {
                    let wait = retry_after(&resp).unwrap_or_else(|| {
                        backoff::backoff::Backoff::next_backoff(&mut backoff).unwrap_or(Duration::from_secs(1))
                    });
                    warn!(status = %resp.status(), attempt = tries, "provider request retrying");
                    tokio::time::sleep(wait.min(MAX_RETRY_AFTER)).await;
                }
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(ProviderError::HttpStatus(status, body));
                }
                Err(e) if e.is_timeout() => return Err(ProviderError::Timeout(e.to_string())),
                Err(e) if tries <= self.max_retries => {
                    let wait = backoff::backoff::Backoff::next_backoff(&mut backoff).unwrap_or(Duration::from_secs(1));
                    warn!(error = %e, attempt = tries, "provider request errored, retrying");
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(ProviderError::Http(e.to_string())),
            }
        }
    }
}

fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
