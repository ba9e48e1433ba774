//! Engine construction errors

/// Errors that can occur while building a [`LocationSearch`](crate::LocationSearch).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine spawns its timers and lookups on the current tokio runtime.
    #[error("LocationSearch must be built from within a tokio runtime")]
    NoRuntime,
}
