//! Session configuration.
//!
//! The session owns persisted settings and turns them into the lookup backend
//! handed to the engine. The engine itself never reads storage.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wayfinder_lib::LocationBackend;
use wayfinder_lib::backend::{CacheConfig, CachedBackend, MapboxGeocoder, StaticCatalog};

use crate::settings::{LOOKUP_MODE, MAPBOX_TOKEN, SettingsError, SettingsStore};

/// Where suggestions come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupMode {
    /// The Mapbox geocoding service.
    #[default]
    Remote,
    /// The built-in demo catalog.
    Static,
}

impl fmt::Display for LookupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMode::Remote => write!(f, "remote"),
            LookupMode::Static => write!(f, "static"),
        }
    }
}

impl FromStr for LookupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(LookupMode::Remote),
            "static" => Ok(LookupMode::Static),
            other => Err(format!("unknown lookup mode '{}' (expected remote or static)", other)),
        }
    }
}

/// Persisted user configuration.
#[derive(Clone)]
pub struct Session {
    settings: SettingsStore,
}

impl Session {
    pub fn new(settings: SettingsStore) -> Self {
        Self { settings }
    }

    /// The stored access token, if any.
    pub async fn mapbox_token(&self) -> Result<Option<String>, SettingsError> {
        Ok(self
            .settings
            .get(&MAPBOX_TOKEN)
            .await?
            .filter(|token| !token.trim().is_empty()))
    }

    /// Stores `token`. A blank token clears the stored one.
    pub async fn set_mapbox_token(&self, token: &str) -> Result<(), SettingsError> {
        let token = token.trim();
        if token.is_empty() {
            return self.clear_mapbox_token().await;
        }
        self.settings.set(&MAPBOX_TOKEN, &token.to_string()).await
    }

    pub async fn clear_mapbox_token(&self) -> Result<(), SettingsError> {
        self.settings.clear(&MAPBOX_TOKEN).await
    }

    /// Stores `token` only when no token is stored yet.
    ///
    /// Returns `true` if the token was stored.
    pub async fn seed_mapbox_token(&self, token: Option<&str>) -> Result<bool, SettingsError> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(false);
        };
        if self.mapbox_token().await?.is_some() {
            return Ok(false);
        }
        self.set_mapbox_token(token).await?;
        Ok(true)
    }

    pub async fn lookup_mode(&self) -> Result<LookupMode, SettingsError> {
        Ok(self.settings.get(&LOOKUP_MODE).await?.unwrap_or_default())
    }

    pub async fn set_lookup_mode(&self, mode: LookupMode) -> Result<(), SettingsError> {
        self.settings.set(&LOOKUP_MODE, &mode).await
    }

    /// Builds the backend for the current settings.
    ///
    /// The token is read once here and injected by value.
    pub async fn build_backend(&self) -> Result<Arc<dyn LocationBackend>, SettingsError> {
        let backend: Arc<dyn LocationBackend> = match self.lookup_mode().await? {
            LookupMode::Static => Arc::new(StaticCatalog::demo()),
            LookupMode::Remote => {
                let token = self.mapbox_token().await?;
                if token.is_none() {
                    log::warn!("No Mapbox token stored; suggestions will ask for one");
                }
                Arc::new(CachedBackend::new(
                    MapboxGeocoder::new(token),
                    CacheConfig::default(),
                ))
            }
        };
        log::info!("Using {} lookup backend", backend.name());
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use wayfinder_lib::error::LookupError;

    use super::*;
    use crate::settings::{InMemoryBackend, SqliteBackend};

    fn session() -> Session {
        Session::new(SettingsStore::new(InMemoryBackend::new()))
    }

    #[test]
    fn test_lookup_mode_parse() {
        assert_eq!("remote".parse::<LookupMode>(), Ok(LookupMode::Remote));
        assert_eq!(" Static ".parse::<LookupMode>(), Ok(LookupMode::Static));
        assert!("offline".parse::<LookupMode>().is_err());
        assert_eq!(LookupMode::Static.to_string(), "static");
    }

    #[tokio::test]
    async fn test_token_set_and_clear() {
        let session = session();
        assert_eq!(session.mapbox_token().await.unwrap(), None);

        session.set_mapbox_token("  pk.abc  ").await.unwrap();
        assert_eq!(session.mapbox_token().await.unwrap().as_deref(), Some("pk.abc"));

        session.set_mapbox_token("   ").await.unwrap();
        assert_eq!(session.mapbox_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_seed_does_not_overwrite() {
        let session = session();

        assert!(!session.seed_mapbox_token(None).await.unwrap());
        assert!(!session.seed_mapbox_token(Some("")).await.unwrap());
        assert!(session.seed_mapbox_token(Some("pk.env")).await.unwrap());
        assert!(!session.seed_mapbox_token(Some("pk.other")).await.unwrap());
        assert_eq!(session.mapbox_token().await.unwrap().as_deref(), Some("pk.env"));
    }

    #[tokio::test]
    async fn test_mode_defaults_to_remote() {
        let session = session();
        assert_eq!(session.lookup_mode().await.unwrap(), LookupMode::Remote);

        session.set_lookup_mode(LookupMode::Static).await.unwrap();
        assert_eq!(session.lookup_mode().await.unwrap(), LookupMode::Static);
    }

    #[tokio::test]
    async fn test_static_backend() {
        let session = session();
        session.set_lookup_mode(LookupMode::Static).await.unwrap();

        let backend = session.build_backend().await.unwrap();
        assert_eq!(backend.name(), "static");

        let names: Vec<_> = backend
            .search("austin")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Austin"]);
    }

    #[tokio::test]
    async fn test_remote_backend_without_token() {
        let backend = session().build_backend().await.unwrap();
        assert_eq!(backend.name(), "mapbox");

        let err = backend.search("pier").await.unwrap_err();
        assert!(matches!(err, LookupError::NotConfigured));
    }

    #[tokio::test]
    async fn test_only_canonical_keys_are_written() {
        let path = std::env::temp_dir().join(format!(
            "wayfinder-session-keys-{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let session = Session::new(SettingsStore::new(SqliteBackend::new(&path).await.unwrap()));
        session.seed_mapbox_token(Some("pk.env")).await.unwrap();
        session.set_mapbox_token("pk.typed").await.unwrap();
        session.set_lookup_mode(LookupMode::Static).await.unwrap();
        session.clear_mapbox_token().await.unwrap();
        session.set_mapbox_token("pk.final").await.unwrap();
        drop(session);

        let reopened = SqliteBackend::new(&path).await.unwrap();
        assert_eq!(
            reopened.stored_names().await,
            vec!["lookup_mode", "mapbox_token"]
        );

        let session = Session::new(SettingsStore::new(reopened));
        assert_eq!(session.mapbox_token().await.unwrap().as_deref(), Some("pk.final"));
        assert_eq!(session.lookup_mode().await.unwrap(), LookupMode::Static);

        let _ = std::fs::remove_file(&path);
    }
}
