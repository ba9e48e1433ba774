//! Location suggestion engine
//!
//! [`LocationSearch`] turns the caller's input text into a dismissible list of
//! candidates: changes are debounced, each pause commits at most one lookup,
//! and only the latest committed lookup may change the state.

mod config;
mod debounce;
mod search;

pub use config::*;
pub use debounce::Debouncer;
pub use search::*;
