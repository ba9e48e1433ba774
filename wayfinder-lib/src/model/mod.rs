//! Data model types

mod candidate;
mod state;

pub use candidate::*;
pub use state::*;
