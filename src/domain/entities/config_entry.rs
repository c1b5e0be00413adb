//! Rows of the `config_entries` table: runtime-tunable values the DB-backed
//! `ConfigStore` reads on demand instead of environment variables.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}
