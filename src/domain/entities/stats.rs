//! Daily rollup statistics per provider, surfaced at `/status`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStat {
    pub provider_name: String,
    pub searches: u32,
    pub hits: u32,
    pub downloads: u32,
    pub failures: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub providers: Vec<ProviderStat>,
    pub subtitles_translated: u32,
    pub subtitles_transcribed: u32,
}

impl DailyStat {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            providers: Vec::new(),
            subtitles_translated: 0,
            subtitles_transcribed: 0,
        }
    }

    pub fn provider_mut(&mut self, provider_name: &str) -> &mut ProviderStat {
        if let Some(idx) = self.providers.iter().position(|p| p.provider_name == provider_name) {
            return &mut self.providers[idx];
        }
        self.providers.push(ProviderStat {
            provider_name: provider_name.to_string(),
            searches: 0,
            hits: 0,
            downloads: 0,
            failures: 0,
        });
        self.providers.last_mut().unwrap()
    }
}
