//! In-memory settings backend.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{SettingKey, SettingsBackend, SettingsError};

/// Process-local settings storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    values: DashMap<SettingKey, Vec<u8>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsBackend for InMemoryBackend {
    async fn load(&self, key: SettingKey) -> Result<Option<Vec<u8>>, SettingsError> {
        Ok(self.values.get(&key).map(|value| value.clone()))
    }

    async fn store(&self, key: SettingKey, value: Vec<u8>) -> Result<(), SettingsError> {
        self.values.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: SettingKey) -> Result<(), SettingsError> {
        self.values.remove(&key);
        Ok(())
    }
}
