//! Circuit breaker state machine.
//!
//! One instance is owned per collaborator (provider, translation backend,
//! media-server backend) -- never shared globally, see DESIGN.md.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerState {
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    pub opened_at: Option<DateTime<Utc>>,
    pub cooldown: chrono::Duration,
}

impl CircuitBreakerState {
    pub fn new(failure_threshold: u32, cooldown: chrono::Duration) -> Self {
        Self {
            state: BreakerState::Closed,
            consecutive_failures: 0,
            failure_threshold,
            opened_at: None,
            cooldown,
        }
    }

    /// Call before each attempt. Flips Open -> HalfOpen once the cooldown
    /// has elapsed, returning whether the call may proceed.
    pub fn allow_request(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let elapsed = self
                    .opened_at
                    .map(|opened| now - opened)
                    .unwrap_or(chrono::Duration::zero());
                if elapsed >= self.cooldown {
                    self.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.state = BreakerState::Closed;
        self.opened_at = None;
    }

    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        self.consecutive_failures += 1;
        match self.state {
            BreakerState::HalfOpen => {
                self.state = BreakerState::Open;
                self.opened_at = Some(now);
            }
            BreakerState::Closed if self.consecutive_failures >= self.failure_threshold => {
                self.state = BreakerState::Open;
                self.opened_at = Some(now);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_failures() {
        let mut cb = CircuitBreakerState::new(3, chrono::Duration::seconds(60));
        let now = Utc::now();
        cb.record_failure(now);
        cb.record_failure(now);
        assert_eq!(cb.state, BreakerState::Closed);
        cb.record_failure(now);
        assert_eq!(cb.state, BreakerState::Open);
    }

    #[test]
    fn half_open_after_cooldown_then_closes_on_success() {
        let mut cb = CircuitBreakerState::new(1, chrono::Duration::seconds(10));
        let t0 = Utc::now();
        cb.record_failure(t0);
        assert_eq!(cb.state, BreakerState::Open);
        assert!(!cb.allow_request(t0 + chrono::Duration::seconds(5)));
        assert!(cb.allow_request(t0 + chrono::Duration::seconds(11)));
        assert_eq!(cb.state, BreakerState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state, BreakerState::Closed);
    }

    #[test]
    fn half_open_failure_reopens() {
        let mut cb = CircuitBreakerState::new(1, chrono::Duration::seconds(10));
        let t0 = Utc::now();
        cb.record_failure(t0);
        cb.allow_request(t0 + chrono::Duration::seconds(11));
        cb.record_failure(t0 + chrono::Duration::seconds(12));
        assert_eq!(cb.state, BreakerState::Open);
    }
}
