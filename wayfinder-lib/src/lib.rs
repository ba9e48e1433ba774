//! Location suggestion library
//!
//! Debounced search-as-you-type over a geocoding service or a static place list,
//! with the dropdown state a caller renders and the map view it drives.

pub mod backend;
pub mod engine;
pub mod error;
pub mod map;
pub mod model;

pub use backend::LocationBackend;
pub use engine::*;
pub use model::*;
