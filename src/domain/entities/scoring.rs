//! Scoring weights used by the provider manager to rank
//! candidates: a (category, match_kind) -> weight table, merged from a
//! hard-coded default and a DB override, plus a format bonus and a
//! per-provider additive modifier applied last.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::subtitle_result::MatchKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoringCategory {
    Episode,
    Movie,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub weights: HashMap<(ScoringCategory, MatchKind), i32>,
    /// Applied when the result's format is ASS or SSA.
    pub format_bonus: i32,
    /// Additive modifier per provider name, default 0.
    pub provider_modifiers: HashMap<String, i32>,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        use MatchKind::*;
        use ScoringCategory::*;

        let mut weights = HashMap::new();
        let table: &[(ScoringCategory, MatchKind, i32)] = &[
            (Episode, Hash, 359),
            (Movie, Hash, 119),
            (Episode, Series, 180),
            (Movie, Title, 60),
            (Episode, Year, 90),
            (Movie, Year, 30),
            (Episode, Season, 30),
            (Episode, Episode, 30),
            (Episode, ReleaseGroup, 14),
            (Movie, ReleaseGroup, 13),
            (Episode, Source, 7),
            (Movie, Source, 7),
            (Episode, AudioCodec, 3),
            (Movie, AudioCodec, 3),
            (Episode, Resolution, 2),
            (Movie, Resolution, 2),
            (Episode, HearingImpaired, 1),
            (Movie, HearingImpaired, 1),
        ];
        for (category, kind, weight) in table {
            weights.insert((*category, *kind), *weight);
        }

        Self {
            weights,
            format_bonus: 50,
            provider_modifiers: HashMap::new(),
        }
    }
}

impl ScoringWeights {
    pub fn weight_for(&self, category: ScoringCategory, kind: MatchKind) -> i32 {
        self.weights.get(&(category, kind)).copied().unwrap_or(0)
    }

    pub fn provider_modifier(&self, provider_name: &str) -> i32 {
        self.provider_modifiers.get(provider_name).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_spec_values() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.weight_for(ScoringCategory::Episode, MatchKind::Hash), 359);
        assert_eq!(weights.weight_for(ScoringCategory::Movie, MatchKind::Hash), 119);
        assert_eq!(weights.weight_for(ScoringCategory::Movie, MatchKind::Series), 0);
    }

    #[test]
    fn unknown_provider_has_zero_modifier() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.provider_modifier("unknown"), 0);
    }
}
