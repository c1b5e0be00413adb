use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::shared::error::RepositoryError;

/// Backs the typed `ConfigStore::get<T>`/`set<T>` accessor over the
/// DB-backed `config_entries` table.
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, RepositoryError>;
    async fn set_raw(&self, key: &str, value: &str) -> Result<(), RepositoryError>;
    async fn delete(&self, key: &str) -> Result<(), RepositoryError>;
}

pub struct ConfigStore<R: ConfigRepository> {
    repo: R,
}

impl<R: ConfigRepository> ConfigStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RepositoryError> {
        match self.repo.get_raw(key).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(value).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.repo.set_raw(key, &raw).await
    }
}
