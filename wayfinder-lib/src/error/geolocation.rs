//! Geolocation error types

/// Errors reported by a [`Geolocator`](crate::map::Geolocator).
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeolocationError {
    /// The platform has no position source.
    #[error("Geolocation is not available")]
    Unavailable,

    /// The user or platform refused access to the position.
    #[error("Geolocation permission denied")]
    Denied,

    /// The position source failed.
    #[error("Geolocation failed: {0}")]
    Failed(String),
}
