//! Candidate locations

/// A geographic position as a `(longitude, latitude)` pair.
///
/// The order follows the geocoding service's `center` arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
}

impl Coordinates {
    /// Creates coordinates from longitude and latitude.
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Returns the point halfway between `self` and `other`.
    pub fn midpoint(&self, other: &Coordinates) -> Coordinates {
        Coordinates::new(
            (self.longitude + other.longitude) / 2.0,
            (self.latitude + other.latitude) / 2.0,
        )
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([longitude, latitude]: [f64; 2]) -> Self {
        Self::new(longitude, latitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.longitude, self.latitude)
    }
}

/// A single location search result.
///
/// `id` is unique within one result set; the rest is display data.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Identifier, unique within a result set.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Full address line, if known.
    pub address: Option<String>,
    /// Human-readable distance (e.g. "0.5 miles away"), if known.
    pub distance: Option<String>,
    /// Position, if known.
    pub coordinates: Option<Coordinates>,
}

impl Candidate {
    /// Creates a candidate with only an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
            distance: None,
            coordinates: None,
        }
    }

    /// Sets the address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the distance label.
    pub fn with_distance(mut self, distance: impl Into<String>) -> Self {
        self.distance = Some(distance.into());
        self
    }

    /// Sets the coordinates.
    pub fn with_coordinates(mut self, coordinates: impl Into<Coordinates>) -> Self {
        self.coordinates = Some(coordinates.into());
        self
    }

    /// Returns `true` if `needle` (already lowercased) occurs in the name or address.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .address
                .as_deref()
                .is_some_and(|address| address.to_lowercase().contains(needle))
    }
}
