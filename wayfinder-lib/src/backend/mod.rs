//! Lookup backends
//!
//! A backend turns a committed query into candidates. The engine only sees the
//! [`LocationBackend`] trait; which backend runs is decided by the caller.

mod cache;
mod catalog;
mod mapbox;

pub use cache::*;
pub use catalog::*;
pub use mapbox::*;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LookupError;
use crate::model::Candidate;

/// Trait for resolving a query into candidate locations.
///
/// Implementations report every failure as a [`LookupError`]; the engine turns
/// it into a rendered state and never propagates it.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use wayfinder_lib::backend::LocationBackend;
/// use wayfinder_lib::error::LookupError;
/// use wayfinder_lib::Candidate;
///
/// struct Airports;
///
/// #[async_trait]
/// impl LocationBackend for Airports {
///     async fn search(&self, query: &str) -> Result<Vec<Candidate>, LookupError> {
///         Ok(vec![Candidate::new("sfo", format!("{query} International"))])
///     }
///
///     fn name(&self) -> &'static str {
///         "airports"
///     }
/// }
/// ```
#[async_trait]
pub trait LocationBackend: Send + Sync {
    /// Resolves `query` into candidates, best first.
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, LookupError>;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: LocationBackend + ?Sized> LocationBackend for Arc<T> {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, LookupError> {
        (**self).search(query).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
