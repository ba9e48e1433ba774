//! Static in-memory place list.

use async_trait::async_trait;

use super::LocationBackend;
use crate::error::LookupError;
use crate::model::Candidate;

/// Location backend filtering a fixed list of places.
///
/// Matches are case-insensitive substrings of the name or the address,
/// returned in list order. Never fails.
///
/// # Example
///
/// ```
/// use wayfinder_lib::backend::StaticCatalog;
/// use wayfinder_lib::Candidate;
///
/// let catalog = StaticCatalog::new(vec![
///     Candidate::new("1", "San Francisco").with_address("California, USA"),
///     Candidate::new("2", "Austin").with_address("Texas, USA"),
/// ]);
///
/// let names: Vec<_> = catalog.filter("san").into_iter().map(|c| c.name).collect();
/// assert_eq!(names, vec!["San Francisco"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<Candidate>,
}

impl StaticCatalog {
    /// Creates a catalog over `entries`.
    pub fn new(entries: Vec<Candidate>) -> Self {
        Self { entries }
    }

    /// The mock places of the ride-booking prototype.
    pub fn demo() -> Self {
        Self::new(vec![
            Candidate::new("1", "San Francisco")
                .with_address("California, USA")
                .with_coordinates([-122.4194, 37.7749]),
            Candidate::new("2", "San Jose")
                .with_address("California, USA")
                .with_coordinates([-121.8863, 37.3382]),
            Candidate::new("3", "Austin")
                .with_address("Texas, USA")
                .with_coordinates([-97.7431, 30.2672]),
            Candidate::new("4", "New York")
                .with_address("New York, USA")
                .with_coordinates([-74.0060, 40.7128]),
            Candidate::new("5", "Target")
                .with_address("789 Mission St, San Francisco, CA")
                .with_distance("0.5 miles away")
                .with_coordinates([-122.4124, 37.7785]),
            Candidate::new("6", "Walmart")
                .with_address("1150 El Camino Real, San Bruno, CA")
                .with_distance("1.2 miles away")
                .with_coordinates([-122.4330, 37.6305]),
        ])
    }

    /// Returns the entries matching `query`, in list order.
    pub fn filter(&self, query: &str) -> Vec<Candidate> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.matches_lowercase(&needle))
            .cloned()
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl LocationBackend for StaticCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, LookupError> {
        Ok(self.filter(query))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
