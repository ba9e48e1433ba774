//! Search state and the presentation view derived from it.

use crate::error::LookupError;

use super::Candidate;

/// Message shown when the remote backend has no credential.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "Mapbox token not found. Please set your token in map settings.";

/// Message shown when a lookup fails for any other reason.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch locations. Please try again.";

/// Why a lookup failed, in the terms the dropdown renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend is missing its credential.
    NotConfigured,
    /// Network, HTTP or parse failure; typing again may succeed.
    Transient,
}

/// A failed lookup as held in [`SearchState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub message: String,
}

impl FailureReason {
    pub fn not_configured() -> Self {
        Self {
            kind: FailureKind::NotConfigured,
            message: NOT_CONFIGURED_MESSAGE.to_string(),
        }
    }

    pub fn transient() -> Self {
        Self {
            kind: FailureKind::Transient,
            message: FETCH_FAILED_MESSAGE.to_string(),
        }
    }
}

impl From<&LookupError> for FailureReason {
    fn from(error: &LookupError) -> Self {
        if error.is_configuration() {
            Self::not_configured()
        } else {
            Self::transient()
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// State of the suggestion engine. Exactly one is active at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    /// Nothing searched, or the query was cleared.
    #[default]
    Idle,
    /// A lookup for `query` has been committed and has not completed.
    Pending { query: String },
    /// The latest committed lookup succeeded.
    Ready {
        query: String,
        candidates: Vec<Candidate>,
    },
    /// The latest committed lookup failed.
    Failed { query: String, reason: FailureReason },
}

impl SearchState {
    /// Returns `true` for [`SearchState::Idle`].
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` for [`SearchState::Pending`].
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// The query this state was produced for, if any.
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Pending { query } | Self::Ready { query, .. } | Self::Failed { query, .. } => {
                Some(query)
            }
        }
    }

    /// The held candidates; empty unless [`SearchState::Ready`].
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            Self::Ready { candidates, .. } => candidates,
            _ => &[],
        }
    }

    /// The failure, if [`SearchState::Failed`].
    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// What the dropdown should render.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionView {
    /// Nothing to show.
    Hidden,
    /// A lookup is running.
    Searching { query: String },
    /// Results to list.
    Suggestions(Vec<Candidate>),
    /// The lookup succeeded with zero candidates.
    NoResults,
    /// The lookup backend is not configured.
    NotConfigured(String),
    /// The lookup failed; the user can retry.
    Failed(String),
}

impl SuggestionView {
    /// Derives the view from visibility and state.
    pub fn derive(visible: bool, state: &SearchState) -> Self {
        if !visible {
            return Self::Hidden;
        }
        match state {
            SearchState::Idle => Self::Hidden,
            SearchState::Pending { query } => Self::Searching {
                query: query.clone(),
            },
            SearchState::Ready { candidates, .. } if candidates.is_empty() => Self::NoResults,
            SearchState::Ready { candidates, .. } => Self::Suggestions(candidates.clone()),
            SearchState::Failed { reason, .. } => match reason.kind {
                FailureKind::NotConfigured => Self::NotConfigured(reason.message.clone()),
                FailureKind::Transient => Self::Failed(reason.message.clone()),
            },
        }
    }

    /// Returns `true` unless [`SuggestionView::Hidden`].
    pub fn is_shown(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(candidates: Vec<Candidate>) -> SearchState {
        SearchState::Ready {
            query: "san".to_string(),
            candidates,
        }
    }

    #[test]
    fn test_hidden_view_ignores_state() {
        let state = ready(vec![Candidate::new("sf", "San Francisco")]);
        assert_eq!(SuggestionView::derive(false, &state), SuggestionView::Hidden);
        assert_eq!(
            SuggestionView::derive(true, &SearchState::Idle),
            SuggestionView::Hidden
        );
    }

    #[test]
    fn test_empty_success_is_no_results() {
        assert_eq!(
            SuggestionView::derive(true, &ready(Vec::new())),
            SuggestionView::NoResults
        );
    }

    #[test]
    fn test_failure_views() {
        let not_configured = SearchState::Failed {
            query: "san".to_string(),
            reason: FailureReason::from(&LookupError::NotConfigured),
        };
        assert_eq!(
            SuggestionView::derive(true, &not_configured),
            SuggestionView::NotConfigured(NOT_CONFIGURED_MESSAGE.to_string())
        );

        let transient = SearchState::Failed {
            query: "san".to_string(),
            reason: FailureReason::from(&LookupError::http(500, "boom")),
        };
        assert_eq!(
            SuggestionView::derive(true, &transient),
            SuggestionView::Failed(FETCH_FAILED_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_state_accessors() {
        let pending = SearchState::Pending {
            query: "sa".to_string(),
        };
        assert!(pending.is_pending());
        assert_eq!(pending.query(), Some("sa"));
        assert!(pending.candidates().is_empty());
        assert_eq!(SearchState::Idle.query(), None);
    }
}
