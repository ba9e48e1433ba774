//! Cache configuration

use std::time::Duration;

/// Configuration for the lookup result cache.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wayfinder_lib::backend::CacheConfig;
///
/// let config = CacheConfig::default().with_ttl(Duration::from_secs(60));
/// assert_eq!(config.ttl, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a successful result stays valid.
    ///
    /// Default: 5 minutes
    pub ttl: Duration,

    /// Entry count at which inserting first sweeps expired entries, then
    /// evicts the entry closest to expiry.
    ///
    /// Default: 256
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300), // 5 minutes
            max_entries: 256,
        }
    }
}

impl CacheConfig {
    /// Creates a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the entry limit.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Creates a config with no caching (zero TTL).
    pub fn no_cache() -> Self {
        Self {
            ttl: Duration::ZERO,
            ..Self::default()
        }
    }
}
