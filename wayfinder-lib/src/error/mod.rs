//! Error types

mod engine;
mod geolocation;
mod lookup;

pub use engine::*;
pub use geolocation::*;
pub use lookup::*;
