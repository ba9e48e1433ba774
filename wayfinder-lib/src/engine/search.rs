//! The location suggestion engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::SearchConfig;
use super::debounce::Debouncer;
use crate::backend::LocationBackend;
use crate::error::EngineError;
use crate::error::LookupError;
use crate::model::{Candidate, FailureReason, SearchState, SuggestionView};

/// Callback receiving the candidate the user picked.
pub type SelectCallback = Arc<dyn Fn(Candidate) + Send + Sync>;

/// Mutable engine state, guarded by one lock.
#[derive(Debug, Default)]
struct SearchInner {
    /// Text as last pushed by the caller (untrimmed).
    query: String,
    state: SearchState,
    visible: bool,
    /// Trimmed query of the last accepted trigger.
    last_committed: Option<String>,
    /// Bumped on every commit and reset; completions carrying an older value are stale.
    generation: u64,
    disposed: bool,
}

impl SearchInner {
    fn reset(&mut self) {
        self.generation += 1;
        self.state = SearchState::Idle;
        self.visible = false;
        self.last_committed = None;
    }
}

/// State shared with timer and lookup tasks.
struct Shared {
    inner: RwLock<SearchInner>,
    backend: Arc<dyn LocationBackend>,
    min_query_len: usize,
    runtime: Handle,
    shutdown: CancellationToken,
    dirty: AtomicBool,
    revision: watch::Sender<u64>,
}

impl Shared {
    fn touch(&self) {
        self.dirty.store(true, Ordering::SeqCst);
        self.revision.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    fn is_searchable(&self, query: &str) -> bool {
        query.chars().count() >= self.min_query_len
    }

    /// Enters `Pending` for the current query, shows the dropdown and issues
    /// the lookup.
    ///
    /// A timer passes the text it was armed for as `armed`; if the query has
    /// moved on since, the newer text is left to its own timer. Without
    /// `force`, a query equal to the last committed one is left alone.
    fn commit(self: &Arc<Self>, armed: Option<&str>, force: bool) {
        let (generation, query) = {
            let Ok(mut guard) = self.inner.write() else {
                return;
            };
            if guard.disposed {
                return;
            }
            let query = guard.query.trim().to_string();
            if armed.is_some_and(|armed| armed != query) {
                log::debug!("Skipping timer armed for {:?}, query is now {:?}", armed, query);
                return;
            }
            if !self.is_searchable(&query) {
                return;
            }
            if !force && guard.last_committed.as_deref() == Some(query.as_str()) {
                return;
            }
            guard.generation += 1;
            guard.state = SearchState::Pending {
                query: query.clone(),
            };
            guard.visible = true;
            guard.last_committed = Some(query.clone());
            (guard.generation, query)
        };
        self.touch();

        log::debug!(
            "Committing {} lookup #{}: {:?}",
            self.backend.name(),
            generation,
            query
        );

        let shared = Arc::clone(self);
        let cancel = self.shutdown.child_token();
        self.runtime.spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => return,
                result = shared.backend.search(&query) => result,
            };
            shared.complete(generation, result);
        });
    }

    /// Applies a lookup result unless a newer commit or a reset superseded it.
    fn complete(&self, generation: u64, result: Result<Vec<Candidate>, LookupError>) {
        {
            let Ok(mut guard) = self.inner.write() else {
                return;
            };
            if guard.disposed || guard.generation != generation {
                log::debug!(
                    "Discarding stale {} lookup #{} (current #{})",
                    self.backend.name(),
                    generation,
                    guard.generation
                );
                return;
            }
            let SearchState::Pending { query } = &guard.state else {
                return;
            };
            let query = query.clone();

            guard.state = match result {
                Ok(candidates) => {
                    log::debug!("Lookup #{} for {:?}: {} candidates", generation, query, candidates.len());
                    SearchState::Ready { query, candidates }
                }
                Err(error) => {
                    if error.is_retryable() || error.is_configuration() {
                        log::warn!("{} lookup for {:?} failed: {}", self.backend.name(), query, error);
                    } else {
                        log::error!("{} lookup for {:?} failed: {}", self.backend.name(), query, error);
                    }
                    SearchState::Failed {
                        reason: FailureReason::from(&error),
                        query,
                    }
                }
            };
            guard.visible = true;
        }
        self.touch();
    }
}

/// Debounced search-as-you-type over a [`LocationBackend`].
///
/// The caller owns the input text and pushes every change through
/// [`set_query`](Self::set_query). After the configured quiet period the engine
/// commits the query, issues one lookup, and exposes the outcome through
/// [`state`](Self::state) and [`view`](Self::view). A lookup superseded by a newer
/// commit, a cleared query, or disposal never changes the state.
///
/// Timers and lookups run on the tokio runtime the engine was built on.
/// Dropping the engine tears both down.
///
/// # Example
///
/// ```ignore
/// use wayfinder_lib::LocationSearch;
/// use wayfinder_lib::backend::StaticCatalog;
///
/// let search = LocationSearch::builder()
///     .backend(StaticCatalog::demo())
///     .on_select(|candidate| println!("picked {}", candidate.name))
///     .build()?;
///
/// search.set_query("san");
/// let mut changes = search.subscribe();
/// changes.changed().await?;
/// println!("{:?}", search.view());
/// ```
pub struct LocationSearch {
    shared: Arc<Shared>,
    debouncer: Debouncer,
    on_select: Option<SelectCallback>,
}

impl LocationSearch {
    /// Creates a new builder for constructing an engine.
    pub fn builder() -> LocationSearchBuilder<Missing> {
        LocationSearchBuilder::new()
    }

    // -------------------------------------------------------------------------
    // Input events
    // -------------------------------------------------------------------------

    /// Records a change of the caller's input text.
    ///
    /// A query that trims to fewer than the minimum length resets the engine to
    /// `Idle` immediately, hiding the dropdown and invalidating any pending
    /// timer or lookup. Otherwise the debounce timer is (re)armed, unless the
    /// query equals the last committed one.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let mut arm = None;
        {
            let Ok(mut guard) = self.shared.inner.write() else {
                return;
            };
            if guard.disposed {
                return;
            }
            let trimmed = text.trim();
            if !self.shared.is_searchable(trimmed) {
                self.debouncer.cancel();
                guard.reset();
            } else if guard.last_committed.as_deref() == Some(trimmed) {
                self.debouncer.cancel();
            } else {
                arm = Some(trimmed.to_string());
            }
            guard.query = text;
        }

        if let Some(armed) = arm {
            let shared = Arc::clone(&self.shared);
            self.debouncer.arm(move || shared.commit(Some(&armed), false));
        }
        self.shared.touch();
    }

    /// Clears the query. Same as `set_query("")`.
    pub fn clear(&self) {
        self.set_query(String::new());
    }

    /// Handles the input gaining focus: re-shows the held state if the query is
    /// non-empty and the dropdown is hidden. Never issues a lookup.
    pub fn focus(&self) {
        let changed = match self.shared.inner.write() {
            Ok(mut guard) => {
                if !guard.disposed && !guard.visible && !guard.query.trim().is_empty() {
                    guard.visible = true;
                    true
                } else {
                    false
                }
            }
            Err(_) => false,
        };
        if changed {
            self.shared.touch();
        }
    }

    /// Handles a pointer event outside the dropdown: hides it, keeping the state.
    pub fn dismiss(&self) {
        let changed = match self.shared.inner.write() {
            Ok(mut guard) if !guard.disposed => std::mem::replace(&mut guard.visible, false),
            _ => false,
        };
        if changed {
            self.shared.touch();
        }
    }

    /// Picks the candidate at `index` of the visible result list.
    ///
    /// Invokes the selection callback with that candidate, hides the dropdown,
    /// and returns it. The result list is retained. The candidate's name counts
    /// as the committed query, so the caller writing it back into the input does
    /// not start a new lookup.
    pub fn select(&self, index: usize) -> Option<Candidate> {
        self.select_where(|candidates| candidates.get(index))
    }

    /// Picks the visible candidate with the given id.
    pub fn select_id(&self, id: &str) -> Option<Candidate> {
        self.select_where(|candidates| candidates.iter().find(|c| c.id == id))
    }

    fn select_where<F>(&self, pick: F) -> Option<Candidate>
    where
        F: FnOnce(&[Candidate]) -> Option<&Candidate>,
    {
        let candidate = {
            let Ok(mut guard) = self.shared.inner.write() else {
                return None;
            };
            if guard.disposed || !guard.visible {
                return None;
            }
            let candidate = pick(guard.state.candidates())?.clone();
            guard.visible = false;
            guard.last_committed = Some(candidate.name.trim().to_string());
            candidate
        };
        self.shared.touch();

        if let Some(on_select) = &self.on_select {
            on_select(candidate.clone());
        }
        Some(candidate)
    }

    /// Commits the current query right away, even if it was committed before.
    pub fn retry(&self) {
        self.debouncer.cancel();
        self.shared.commit(None, true);
    }

    /// Tears the engine down: cancels the timer and in-flight lookups and makes
    /// later completions inert. Idempotent.
    pub fn dispose(&self) {
        self.shared.shutdown.cancel();
        self.debouncer.cancel();
        if let Ok(mut guard) = self.shared.inner.write()
            && !guard.disposed
        {
            guard.disposed = true;
            guard.generation += 1;
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The text last pushed by the caller.
    pub fn query(&self) -> String {
        self.shared
            .inner
            .read()
            .map(|guard| guard.query.clone())
            .unwrap_or_default()
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.shared
            .inner
            .read()
            .map(|guard| guard.state.clone())
            .unwrap_or_default()
    }

    /// The held candidates; empty unless `Ready`.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.shared
            .inner
            .read()
            .map(|guard| guard.state.candidates().to_vec())
            .unwrap_or_default()
    }

    /// Whether the dropdown is shown.
    pub fn is_visible(&self) -> bool {
        self.shared
            .inner
            .read()
            .map(|guard| guard.visible)
            .unwrap_or(false)
    }

    /// What the dropdown should render.
    pub fn view(&self) -> SuggestionView {
        self.shared
            .inner
            .read()
            .map(|guard| SuggestionView::derive(guard.visible, &guard.state))
            .unwrap_or(SuggestionView::Hidden)
    }

    /// Returns `true` while a debounce timer is waiting.
    pub fn is_debouncing(&self) -> bool {
        self.debouncer.is_armed()
    }

    /// Returns `true` once [`dispose`](Self::dispose) ran.
    pub fn is_disposed(&self) -> bool {
        self.shared
            .inner
            .read()
            .map(|guard| guard.disposed)
            .unwrap_or(true)
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.shared.backend.name()
    }

    /// Subscribes to change notifications.
    ///
    /// The value is a revision counter bumped on every observable change,
    /// including asynchronous lookup completions.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the state has changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.shared.dirty.store(false, Ordering::SeqCst);
    }
}

impl Drop for LocationSearch {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for LocationSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSearch")
            .field("backend", &self.shared.backend.name())
            .field("query", &self.query())
            .field("state", &self.state())
            .field("visible", &self.is_visible())
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`LocationSearch`].
///
/// # Required Fields
///
/// - `backend` - A [`LocationBackend`] implementation
///
/// # Example
///
/// ```ignore
/// let search = LocationSearch::builder()
///     .backend(MapboxGeocoder::new(session.mapbox_token().await?))
///     .config(SearchConfig::default().with_debounce(Duration::from_millis(250)))
///     .on_select(move |candidate| {
///         let _ = tx.send(candidate);
///     })
///     .build()?;
/// ```
pub struct LocationSearchBuilder<Backend> {
    backend: Backend,
    on_select: Option<SelectCallback>,
    config: SearchConfig,
}

impl LocationSearchBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            backend: Missing,
            on_select: None,
            config: SearchConfig::default(),
        }
    }

    /// Sets the lookup backend.
    pub fn backend<T: LocationBackend + 'static>(
        self,
        backend: T,
    ) -> LocationSearchBuilder<Set<Arc<dyn LocationBackend>>> {
        LocationSearchBuilder {
            backend: Set(Arc::new(backend) as Arc<dyn LocationBackend>),
            on_select: self.on_select,
            config: self.config,
        }
    }
}

impl Default for LocationSearchBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> LocationSearchBuilder<B> {
    /// Sets the callback invoked with the selected candidate.
    pub fn on_select<F>(mut self, on_select: F) -> Self
    where
        F: Fn(Candidate) + Send + Sync + 'static,
    {
        self.on_select = Some(Arc::new(on_select));
        self
    }

    /// Sets the engine configuration.
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }
}

impl LocationSearchBuilder<Set<Arc<dyn LocationBackend>>> {
    /// Builds the [`LocationSearch`] on the current tokio runtime.
    pub fn build(self) -> Result<LocationSearch, EngineError> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        let shutdown = CancellationToken::new();
        let (revision, _) = watch::channel(0);

        let debouncer = Debouncer::new(self.config.debounce, runtime.clone(), shutdown.clone());
        let shared = Arc::new(Shared {
            inner: RwLock::new(SearchInner::default()),
            backend: self.backend.0,
            min_query_len: self.config.min_query_len,
            runtime,
            shutdown,
            dirty: AtomicBool::new(false),
            revision,
        });

        Ok(LocationSearch {
            shared,
            debouncer,
            on_select: self.on_select,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::StaticCatalog;

    fn engine() -> LocationSearch {
        LocationSearch::builder()
            .backend(StaticCatalog::demo())
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_for_outdated_text_does_not_commit() {
        let search = engine();
        search.set_query("san jose");

        // A timer for "san" that already passed its ticket check.
        search.shared.commit(Some("san"), false);
        assert_eq!(search.state(), SearchState::Idle);

        tokio::time::sleep(Duration::from_millis(301)).await;
        let names: Vec<_> = search.candidates().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["San Jose"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_shows_searching() {
        let search = engine();
        search.set_query("austin");
        assert!(!search.is_visible());

        search.shared.commit(Some("austin"), false);
        assert!(search.is_visible());
        assert_eq!(
            search.view(),
            SuggestionView::Searching {
                query: "austin".to_string()
            }
        );
    }
}
