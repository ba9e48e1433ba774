//! Map view model
//!
//! What a caller hands its map renderer: a center, a zoom level and markers.
//! The renderer itself is not part of this crate.

use async_trait::async_trait;

use crate::error::GeolocationError;
use crate::model::{Candidate, Coordinates};

/// Default center: San Francisco.
pub const DEFAULT_CENTER: Coordinates = Coordinates::new(-122.4194, 37.7749);
/// Default zoom level.
pub const DEFAULT_ZOOM: f64 = 12.0;

const DESTINATION_ZOOM: f64 = 14.0;
const ROUTE_ZOOM: f64 = 13.0;

/// Marker color for the user's position.
pub const USER_COLOR: &str = "#3b82f6";
/// Marker color for a destination.
pub const DESTINATION_COLOR: &str = "#ef4444";

/// A colored pin on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinates,
    pub color: String,
}

impl Marker {
    pub fn new(position: Coordinates, color: impl Into<String>) -> Self {
        Self {
            position,
            color: color.into(),
        }
    }
}

/// Source of the device's current position.
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Returns the current position.
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// A geolocator answering with a fixed position, or `Unavailable` without one.
#[derive(Debug, Clone, Default)]
pub struct FixedGeolocator {
    position: Option<Coordinates>,
}

impl FixedGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.position.ok_or(GeolocationError::Unavailable)
    }
}

/// Center, zoom and markers of a map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: f64,
    pub markers: Vec<Marker>,
    /// Position reported by the last successful [`locate`](Self::locate).
    pub current_location: Option<Coordinates>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            markers: Vec::new(),
            current_location: None,
        }
    }
}

impl MapView {
    pub fn new(center: Coordinates, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            ..Default::default()
        }
    }

    /// Centers on a selected candidate and pins it as the destination.
    ///
    /// Returns `false` and leaves the view unchanged when the candidate has no
    /// coordinates.
    pub fn focus_on(&mut self, candidate: &Candidate) -> bool {
        let Some(position) = candidate.coordinates else {
            return false;
        };
        self.center = position;
        self.zoom = DESTINATION_ZOOM;
        self.markers.retain(|marker| marker.color != DESTINATION_COLOR);
        self.markers.push(Marker::new(position, DESTINATION_COLOR));
        true
    }

    /// Frames a trip: centers between `from` and `to` with both pinned.
    pub fn frame(&mut self, from: Coordinates, to: Coordinates) {
        self.center = from.midpoint(&to);
        self.zoom = ROUTE_ZOOM;
        self.markers = vec![
            Marker::new(from, USER_COLOR),
            Marker::new(to, DESTINATION_COLOR),
        ];
    }

    /// The destination marker's position, if one is pinned.
    pub fn destination(&self) -> Option<Coordinates> {
        self.markers
            .iter()
            .find(|marker| marker.color == DESTINATION_COLOR)
            .map(|marker| marker.position)
    }

    /// Asks `geolocator` for the current position and pins it.
    ///
    /// A failure is logged and otherwise ignored; the view keeps its center.
    pub async fn locate(&mut self, geolocator: &dyn Geolocator) -> Option<Coordinates> {
        match geolocator.current_position().await {
            Ok(position) => {
                self.current_location = Some(position);
                self.markers.retain(|marker| marker.color != USER_COLOR);
                self.markers.push(Marker::new(position, USER_COLOR));
                Some(position)
            }
            Err(e) => {
                log::warn!("Could not get current location: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_on_candidate() {
        let mut map = MapView::default();
        let pier = Candidate::new("a1", "Pier 1").with_coordinates([-122.4, 37.8]);

        assert!(map.focus_on(&pier));
        assert_eq!(map.center, Coordinates::new(-122.4, 37.8));
        assert_eq!(map.destination(), Some(Coordinates::new(-122.4, 37.8)));

        let ferry = Candidate::new("b2", "Ferry").with_coordinates([-122.39, 37.79]);
        map.focus_on(&ferry);
        assert_eq!(map.markers.len(), 1);
    }

    #[test]
    fn test_focus_without_coordinates() {
        let mut map = MapView::default();
        assert!(!map.focus_on(&Candidate::new("x", "Nowhere")));
        assert_eq!(map, MapView::default());
    }

    #[test]
    fn test_frame_trip() {
        let mut map = MapView::default();
        map.frame(DEFAULT_CENTER, Coordinates::new(-122.4124, 37.7785));

        assert_eq!(map.zoom, ROUTE_ZOOM);
        assert_eq!(map.markers[0].color, USER_COLOR);
        assert_eq!(map.markers[1].color, DESTINATION_COLOR);
    }

    #[tokio::test]
    async fn test_locate_failure_keeps_center() {
        let mut map = MapView::default();
        assert_eq!(map.locate(&FixedGeolocator::default()).await, None);
        assert_eq!(map.center, DEFAULT_CENTER);
        assert!(map.markers.is_empty());
    }

    #[tokio::test]
    async fn test_locate_pins_position() {
        let mut map = MapView::default();
        let here = Coordinates::new(-122.41, 37.77);
        assert_eq!(map.locate(&FixedGeolocator::new(Some(here))).await, Some(here));
        assert_eq!(map.current_location, Some(here));
        assert_eq!(map.markers, vec![Marker::new(here, USER_COLOR)]);
    }
}
