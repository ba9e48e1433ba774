//! SQLite settings backend.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::rusqlite::{OptionalExtension, params};
use async_trait::async_trait;
use dashmap::DashMap;

use super::{SettingKey, SettingsBackend, SettingsError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL
)";

/// Settings persisted in one SQLite table, with reads served from a DashMap
/// after the first load.
pub struct SqliteBackend {
    client: Client,
    cache: DashMap<SettingKey, Vec<u8>>,
}

impl SqliteBackend {
    /// Opens (or creates) the settings database at `path` and folds legacy key
    /// spellings into their canonical keys.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let client = async_sqlite::ClientBuilder::new()
            .path(path)
            .open()
            .await?;

        client.conn(|conn| conn.execute(SCHEMA, [])).await?;

        let backend = Self {
            client,
            cache: DashMap::new(),
        };
        backend.canonicalize_keys().await?;
        Ok(backend)
    }

    /// Moves rows stored under a legacy name to the canonical key. A value
    /// already stored under the canonical key wins.
    async fn canonicalize_keys(&self) -> Result<(), SettingsError> {
        for key in SettingKey::ALL {
            for &legacy in key.legacy_names() {
                let moved = self
                    .client
                    .conn(move |conn| {
                        let tx = conn.unchecked_transaction()?;
                        let moved = tx.execute(
                            "INSERT OR IGNORE INTO settings (key, value)
                             SELECT ?1, value FROM settings WHERE key = ?2",
                            params![key.as_str(), legacy],
                        )?;
                        tx.execute("DELETE FROM settings WHERE key = ?1", [legacy])?;
                        tx.commit()?;
                        Ok(moved)
                    })
                    .await?;
                if moved > 0 {
                    log::info!("Moved setting {:?} to {}", legacy, key);
                }
            }
        }
        Ok(())
    }

    /// Names of all stored rows, sorted.
    #[cfg(test)]
    pub(crate) async fn stored_names(&self) -> Vec<String> {
        self.client
            .conn(|conn| {
                let mut stmt = conn.prepare("SELECT key FROM settings ORDER BY key")?;
                let names = stmt.query_map([], |row| row.get(0))?;
                names.collect::<Result<Vec<String>, _>>()
            })
            .await
            .unwrap()
    }
}

#[async_trait]
impl SettingsBackend for SqliteBackend {
    async fn load(&self, key: SettingKey) -> Result<Option<Vec<u8>>, SettingsError> {
        if let Some(value) = self.cache.get(&key) {
            return Ok(Some(value.clone()));
        }

        let value = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    [key.as_str()],
                    |row| row.get::<_, Vec<u8>>(0),
                )
                .optional()
            })
            .await?;

        if let Some(value) = &value {
            self.cache.insert(key, value.clone());
        }
        Ok(value)
    }

    async fn store(&self, key: SettingKey, value: Vec<u8>) -> Result<(), SettingsError> {
        let row = value.clone();
        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO settings (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key.as_str(), row],
                )
            })
            .await?;

        self.cache.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: SettingKey) -> Result<(), SettingsError> {
        self.client
            .conn(move |conn| conn.execute("DELETE FROM settings WHERE key = ?1", [key.as_str()]))
            .await?;

        self.cache.remove(&key);
        Ok(())
    }
}
