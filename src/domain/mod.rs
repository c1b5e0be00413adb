//! Domain Layer - Pure business logic and domain models
//!
//! - Entities: core business objects (VideoQuery, SubtitleResult,
//!   WantedItem, Job, ScoringWeights, circuit-breaker state, stats)
//! - Repositories: abstractions over persistence
//!
//! Events are fanned out through [`crate::infrastructure::messaging::NamedEventBus`],
//! which dispatches by name against a closed catalog rather than by typed
//! struct, so there is no separate typed-event module here.

pub mod entities;
pub mod repositories;

pub use entities::{
    AnidbMapping, BlacklistEntry, BreakerState, CircuitBreakerState, ConfigEntry, DailyStat,
    ItemType, Job, JobKind, JobState, MatchKind, ProviderCacheEntry, ProviderStat, ScoringWeights,
    SubtitleFormat, SubtitleKind, SubtitleResult, VideoQuery, WantedItem, WantedStatus,
};
