//! Search session state.

use crate::provider::Image;
use crate::search::{DEFAULT_TERM, max_page};

/// Single source of truth for one browsing session.
///
/// Only [`SearchController`](super::SearchController) mutates it; everyone
/// else sees clones or shared references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    /// Text currently typed in the search box.
    pub query_input: String,
    /// Last term actually searched for; rebuilds the query when paging.
    pub active_term: String,
    /// Ranked results of the current page (at most 12).
    pub results: Vec<Image>,
    /// 1-based current page.
    pub page: u32,
    /// Total pages; 0 means no results or not yet searched.
    pub total_pages: u32,
    /// True while the latest issued request is outstanding.
    pub loading: bool,
    /// True once any search has been issued (default load: once it succeeded).
    pub search_performed: bool,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchState {
    /// Fresh session state primed with the default term.
    #[must_use]
    pub fn new() -> Self {
        Self {
            query_input: String::new(),
            active_term: DEFAULT_TERM.to_string(),
            results: Vec::new(),
            page: 1,
            total_pages: 0,
            loading: false,
            search_performed: false,
        }
    }

    /// True when the "no images found" message should be shown.
    #[must_use]
    pub fn shows_empty_message(&self) -> bool {
        self.search_performed && !self.loading && self.results.is_empty()
    }

    /// The "no images found" message for the active term.
    #[must_use]
    pub fn empty_message(&self) -> String {
        format!(
            "No images found for \"{}\". Try a different search term.",
            self.active_term
        )
    }

    /// True when pagination controls should be shown.
    #[must_use]
    pub fn shows_pagination(&self) -> bool {
        self.total_pages > 1
    }

    /// True when a previous page exists.
    #[must_use]
    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    /// True when a next page exists.
    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Checks the page invariant `1 <= page <= max(total_pages, 1)`.
    #[must_use]
    pub fn page_in_bounds(&self) -> bool {
        (1..=max_page(self.total_pages)).contains(&self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixtures::images;

    #[test]
    fn test_new_state_defaults() {
        let state = SearchState::new();
        assert_eq!(state.active_term, "waterfall nature");
        assert_eq!(state.page, 1);
        assert_eq!(state.total_pages, 0);
        assert!(!state.loading);
        assert!(!state.search_performed);
        assert!(state.page_in_bounds());
    }

    #[test]
    fn test_empty_message_only_after_search_and_not_loading() {
        let mut state = SearchState::new();
        assert!(!state.shows_empty_message());

        state.search_performed = true;
        state.loading = true;
        assert!(!state.shows_empty_message());

        state.loading = false;
        assert!(state.shows_empty_message());
        assert_eq!(
            state.empty_message(),
            "No images found for \"waterfall nature\". Try a different search term."
        );

        state.results = images(&[100]);
        assert!(!state.shows_empty_message());
    }

    #[test]
    fn test_navigation_flags() {
        let mut state = SearchState::new();
        state.total_pages = 3;
        assert!(state.shows_pagination());
        assert!(!state.can_go_prev());
        assert!(state.can_go_next());

        state.page = 3;
        assert!(state.can_go_prev());
        assert!(!state.can_go_next());

        state.total_pages = 1;
        assert!(!state.shows_pagination());
    }
}
