//! Lookup result caching
//!
//! [`CachedBackend`] wraps any backend and answers repeated queries from a
//! concurrent map until their TTL runs out. Only successful results are kept.

mod config;

pub use config::*;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::LocationBackend;
use crate::error::LookupError;
use crate::model::Candidate;

/// A cached result with its expiry.
#[derive(Debug, Clone)]
struct CachedResult {
    candidates: Vec<Candidate>,
    expires_at: Instant,
}

impl CachedResult {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// A backend decorator caching successful lookups per query.
///
/// Queries are keyed trimmed and lowercased, so "San " and "san" share an entry.
///
/// # Example
///
/// ```ignore
/// use wayfinder_lib::backend::{CacheConfig, CachedBackend, MapboxGeocoder};
///
/// let backend = CachedBackend::new(MapboxGeocoder::new(token), CacheConfig::default());
/// ```
#[derive(Debug)]
pub struct CachedBackend<B> {
    inner: B,
    config: CacheConfig,
    store: DashMap<String, CachedResult>,
}

impl<B: LocationBackend> CachedBackend<B> {
    /// Wraps `inner` with the given cache configuration.
    pub fn new(inner: B, config: CacheConfig) -> Self {
        Self {
            inner,
            config,
            store: DashMap::new(),
        }
    }

    /// Returns the wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Number of entries held (including expired ones).
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Removes expired entries, returning how many were removed.
    pub fn gc(&self) -> usize {
        let mut removed = 0;
        self.store.retain(|_, value| {
            if value.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Keeps the store under `max_entries` before `key` is inserted.
    fn make_room(&self, key: &str) {
        if self.store.len() < self.config.max_entries || self.store.contains_key(key) {
            return;
        }
        let swept = self.gc();
        if self.store.len() < self.config.max_entries {
            log::debug!("Swept {} expired cache entries", swept);
            return;
        }
        let oldest = self
            .store
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());
        if let Some(oldest) = oldest {
            self.store.remove(&oldest);
        }
    }

    fn get(&self, key: &str) -> Option<Vec<Candidate>> {
        let entry = self.store.get(key)?;
        if entry.is_expired() {
            drop(entry);
            self.store.remove(key);
            None
        } else {
            Some(entry.candidates.clone())
        }
    }
}

#[async_trait]
impl<B: LocationBackend> LocationBackend for CachedBackend<B> {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, LookupError> {
        let key = query.trim().to_lowercase();

        if let Some(candidates) = self.get(&key) {
            log::debug!("Cache hit for {} lookup: {:?}", self.inner.name(), key);
            return Ok(candidates);
        }

        let candidates = self.inner.search(query).await?;
        if !self.config.ttl.is_zero() {
            self.make_room(&key);
            self.store.insert(
                key,
                CachedResult {
                    candidates: candidates.clone(),
                    expires_at: Instant::now() + self.config.ttl,
                },
            );
        }
        Ok(candidates)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
