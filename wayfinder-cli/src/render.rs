//! Plain-text rendering of the engine and map state.

use std::fmt::Write;

use wayfinder_lib::map::{DESTINATION_COLOR, MapView, USER_COLOR};
use wayfinder_lib::{Candidate, SuggestionView};

use crate::rides::RideOption;

/// Renders the suggestion dropdown, or `None` while it is hidden.
pub fn suggestions(view: &SuggestionView) -> Option<String> {
    let text = match view {
        SuggestionView::Hidden => return None,
        SuggestionView::Searching { query } => format!("  Searching for \"{}\"...", query),
        SuggestionView::NoResults => "  No results".to_string(),
        SuggestionView::NotConfigured(message) => {
            format!("  {}\n  Use :token <value> to set it.", message)
        }
        SuggestionView::Failed(message) => format!("  {}\n  Use :retry to try again.", message),
        SuggestionView::Suggestions(candidates) => {
            let mut out = String::new();
            for (i, candidate) in candidates.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&candidate_line(i + 1, candidate));
            }
            out
        }
    };
    Some(text)
}

fn candidate_line(number: usize, candidate: &Candidate) -> String {
    let mut line = format!("  {}. {}", number, candidate.name);
    if let Some(address) = &candidate.address {
        let _ = write!(line, " - {}", address);
    }
    if let Some(distance) = &candidate.distance {
        let _ = write!(line, " ({})", distance);
    }
    line
}

/// Renders the map's center, zoom and markers.
pub fn map(view: &MapView) -> String {
    let mut out = format!("Map centered at {} (zoom {})", view.center, view.zoom);
    for marker in &view.markers {
        let label = match marker.color.as_str() {
            USER_COLOR => "you",
            DESTINATION_COLOR => "destination",
            _ => "marker",
        };
        let _ = write!(out, "\n  [{}] {}", label, marker.position);
    }
    out
}

/// Renders the ride options for `destination`.
pub fn rides(destination: &str, options: &[RideOption]) -> String {
    let mut out = format!("Rides to {}:", destination);
    for (i, option) in options.iter().enumerate() {
        let _ = write!(
            out,
            "\n  {}. {} - {} - {}",
            i + 1,
            option.price(),
            option.duration,
            option.distance
        );
    }
    out
}
