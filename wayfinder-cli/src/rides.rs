//! Ride options offered for a destination.

/// One bookable ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RideOption {
    /// How far away the driver is.
    pub distance: &'static str,
    /// Pickup time range.
    pub duration: &'static str,
    /// Fare in cents.
    pub price_cents: u32,
}

impl RideOption {
    /// Fare formatted as dollars, e.g. `$9.50`.
    pub fn price(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }
}

/// The fixed offer shown for every destination.
pub const RIDE_OPTIONS: [RideOption; 3] = [
    RideOption {
        distance: "0.5 miles away",
        duration: "3-5 minutes",
        price_cents: 950,
    },
    RideOption {
        distance: "0.7 miles away",
        duration: "5-7 minutes",
        price_cents: 825,
    },
    RideOption {
        distance: "1.2 miles away",
        duration: "7-9 minutes",
        price_cents: 1025,
    },
];
