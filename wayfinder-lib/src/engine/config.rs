//! Engine configuration

use std::time::Duration;

/// Timing and threshold settings for a [`LocationSearch`](super::LocationSearch).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wayfinder_lib::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_debounce(Duration::from_millis(150))
///     .with_min_query_len(3);
/// ```
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Quiet period after the last change before a lookup is committed.
    ///
    /// Default: 300 ms
    pub debounce: Duration,

    /// Minimum trimmed query length (in characters) that triggers a lookup.
    ///
    /// Default: 2
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_len: 2,
        }
    }
}

impl SearchConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the debounce delay.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the minimum query length.
    pub fn with_min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = len;
        self
    }
}
