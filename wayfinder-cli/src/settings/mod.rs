//! Persisted user settings.
//!
//! Values are read and written through typed [`Setting`] constants and stored
//! bincode-encoded by a [`SettingsBackend`].

mod key;
mod memory;
mod sqlite;

pub use key::{LOOKUP_MODE, MAPBOX_TOKEN, Setting, SettingKey};
pub use memory::InMemoryBackend;
pub use sqlite::SqliteBackend;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Settings error type.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),
    #[error("could not encode {key}: {source}")]
    Encode {
        key: SettingKey,
        source: bincode::Error,
    },
    #[error("stored {key} is unreadable: {source}")]
    Corrupt {
        key: SettingKey,
        source: bincode::Error,
    },
}

/// Encoded-value storage, one slot per [`SettingKey`].
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn load(&self, key: SettingKey) -> Result<Option<Vec<u8>>, SettingsError>;

    async fn store(&self, key: SettingKey, value: Vec<u8>) -> Result<(), SettingsError>;

    /// Removing an empty slot is not an error.
    async fn remove(&self, key: SettingKey) -> Result<(), SettingsError>;
}

/// Typed access to the settings backend.
#[derive(Clone)]
pub struct SettingsStore {
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsStore {
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        setting: &Setting<T>,
    ) -> Result<Option<T>, SettingsError> {
        let key = setting.key();
        let Some(bytes) = self.backend.load(key).await? else {
            return Ok(None);
        };
        bincode::deserialize(&bytes)
            .map(Some)
            .map_err(|source| SettingsError::Corrupt { key, source })
    }

    pub async fn set<T: Serialize + Sync>(
        &self,
        setting: &Setting<T>,
        value: &T,
    ) -> Result<(), SettingsError> {
        let key = setting.key();
        let bytes =
            bincode::serialize(value).map_err(|source| SettingsError::Encode { key, source })?;
        self.backend.store(key, bytes).await
    }

    pub async fn clear<T>(&self, setting: &Setting<T>) -> Result<(), SettingsError> {
        self.backend.remove(setting.key()).await
    }
}
