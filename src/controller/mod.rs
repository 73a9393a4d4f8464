//! Search controller: the state machine behind browsing.
//!
//! # Architecture
//!
//! - [`SearchState`] - Single source of truth for one session
//! - [`SearchController`] - Owns the state; every network-issuing operation is
//!   split into a synchronous `begin_*` step returning a [`PendingSearch`] and
//!   an [`apply`](SearchController::apply) step taking the provider outcome
//! - [`SearchSession`] - Task that owns a controller, runs provider calls
//!   concurrently and publishes state snapshots over a `watch` channel
//!
//! Each issued request is stamped with a monotonically increasing sequence
//! number. Only the completion carrying the latest number is applied; older
//! ones are discarded as stale, so a slow response can never overwrite newer
//! state. Two things survive a discarded search: the search box is still
//! cleared when no later search replaced it, and the result total of a new
//! term is taken from the first page response that does get applied.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use imagesearch_core::{HttpTimeouts, ProxyProvider, SearchController};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ProxyProvider::new("http://127.0.0.1:3000", HttpTimeouts::default())?;
//! let mut controller = SearchController::new(Arc::new(provider));
//! controller.load_default().await?;
//! controller.submit("mountains").await?;
//! controller.next_page().await?;
//! println!("page {} of {}", controller.state().page, controller.state().total_pages);
//! # Ok(())
//! # }
//! ```

mod error;
mod session;
mod state;

pub use error::SearchError;
pub use session::{SearchSession, SessionCommand, SessionHandle};
pub use state::SearchState;

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::provider::{ImageSearchProvider, ProviderError, SearchPage, SearchRequest};
use crate::search::{
    DEFAULT_TERM, PAGE_SIZE, browse_request, check_page, max_page, rank, total_pages,
};

/// What a pending request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Startup load of the default term.
    Default,
    /// New search from user input.
    Submit,
    /// Navigation to the given page of the active term.
    Page(u32),
}

/// A request that has been issued but whose outcome is not applied yet.
#[derive(Debug, Clone)]
pub struct PendingSearch {
    seq: u64,
    kind: SearchKind,
    request: SearchRequest,
}

impl PendingSearch {
    /// Sequence number stamped at issue time.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// What the request was issued for.
    #[must_use]
    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    /// The provider request to send.
    #[must_use]
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }
}

/// Result of an operation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Outcome applied to the state.
    Applied,
    /// A newer request was issued meanwhile; outcome discarded.
    Stale,
    /// Navigation target out of range; nothing was issued.
    Ignored,
}

/// Owns a [`SearchState`] and drives it against an [`ImageSearchProvider`].
pub struct SearchController {
    provider: Arc<dyn ImageSearchProvider>,
    state: SearchState,
    latest_seq: u64,
    latest_submit_seq: u64,
    // Set while the active term's result total has not been applied yet.
    total_pending: bool,
}

impl std::fmt::Debug for SearchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchController")
            .field("provider", &self.provider.name())
            .field("state", &self.state)
            .field("latest_seq", &self.latest_seq)
            .field("latest_submit_seq", &self.latest_submit_seq)
            .field("total_pending", &self.total_pending)
            .finish()
    }
}

impl SearchController {
    /// Creates a controller with fresh state.
    #[must_use]
    pub fn new(provider: Arc<dyn ImageSearchProvider>) -> Self {
        Self {
            provider,
            state: SearchState::new(),
            latest_seq: 0,
            latest_submit_seq: 0,
            total_pending: false,
        }
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// The provider requests are sent to.
    #[must_use]
    pub fn provider(&self) -> Arc<dyn ImageSearchProvider> {
        Arc::clone(&self.provider)
    }

    /// Sequence number of the most recently issued request (0 before any).
    #[must_use]
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Replaces the text in the search box.
    pub fn set_query_input(&mut self, text: impl Into<String>) {
        self.state.query_input = text.into();
    }

    fn issue(&mut self, kind: SearchKind, request: SearchRequest) -> PendingSearch {
        self.latest_seq += 1;
        self.state.loading = true;
        debug!(seq = self.latest_seq, ?kind, query = %request.query, page = request.page, "issuing search");
        PendingSearch {
            seq: self.latest_seq,
            kind,
            request,
        }
    }

    /// Starts the startup load of [`DEFAULT_TERM`].
    pub fn begin_load_default(&mut self) -> PendingSearch {
        self.state.active_term = DEFAULT_TERM.to_string();
        self.total_pending = true;
        self.issue(SearchKind::Default, browse_request(DEFAULT_TERM, 1))
    }

    /// Starts a new search for `term`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyQuery`] when `term` is blank; the state is
    /// left untouched.
    pub fn begin_submit(&mut self, term: &str) -> Result<PendingSearch, SearchError> {
        let term = term.trim();
        if term.is_empty() {
            debug!("ignoring blank search submission");
            return Err(SearchError::EmptyQuery);
        }

        self.state.search_performed = true;
        self.state.page = 1;
        self.state.active_term = term.to_string();
        self.total_pending = true;
        let pending = self.issue(SearchKind::Submit, browse_request(term, 1));
        self.latest_submit_seq = pending.seq;
        Ok(pending)
    }

    /// Starts a new search for the current query input.
    ///
    /// # Errors
    ///
    /// Same as [`begin_submit`](Self::begin_submit).
    pub fn begin_submit_query_input(&mut self) -> Result<PendingSearch, SearchError> {
        let term = self.state.query_input.clone();
        self.begin_submit(&term)
    }

    /// Starts navigation to `page`; `None` when it is out of `1..=total_pages`.
    pub fn begin_go_to_page(&mut self, page: u32) -> Option<PendingSearch> {
        let Some(page) = check_page(page, self.state.total_pages) else {
            debug!(
                requested = page,
                total_pages = self.state.total_pages,
                "ignoring out-of-range page request"
            );
            return None;
        };
        let request = browse_request(&self.state.active_term, page);
        Some(self.issue(SearchKind::Page(page), request))
    }

    /// Starts navigation to the next page, if any.
    pub fn begin_next_page(&mut self) -> Option<PendingSearch> {
        self.begin_go_to_page(self.state.page.saturating_add(1))
    }

    /// Starts navigation to the previous page, if any.
    pub fn begin_prev_page(&mut self) -> Option<PendingSearch> {
        self.begin_go_to_page(self.state.page.saturating_sub(1))
    }

    /// Applies a provider outcome for `pending`.
    ///
    /// Stale outcomes (anything but the latest issued request) are discarded
    /// and leave `loading` and the results untouched. A stale submission
    /// still clears the query input unless a later submission replaced it.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Upstream`] when the latest request failed. The
    /// state has been updated by then: default loads and submissions clear
    /// results and pages, page navigation keeps the previous page.
    pub fn apply(
        &mut self,
        pending: PendingSearch,
        outcome: Result<SearchPage, ProviderError>,
    ) -> Result<Completion, SearchError> {
        if pending.seq != self.latest_seq {
            if pending.kind == SearchKind::Submit && pending.seq == self.latest_submit_seq {
                self.state.query_input.clear();
            }
            debug!(
                seq = pending.seq,
                latest_seq = self.latest_seq,
                "discarding stale search response"
            );
            return Ok(Completion::Stale);
        }

        self.state.loading = false;
        if pending.kind == SearchKind::Submit {
            self.state.query_input.clear();
        }

        match outcome {
            Ok(page) => {
                let pages = total_pages(page.total, PAGE_SIZE);
                self.state.results = rank(page.results, PAGE_SIZE as usize);
                match pending.kind {
                    SearchKind::Default => {
                        self.state.total_pages = pages;
                        self.state.page = 1;
                        self.state.search_performed = true;
                        self.total_pending = false;
                    }
                    SearchKind::Submit => {
                        self.state.total_pages = pages;
                        self.total_pending = false;
                    }
                    SearchKind::Page(number) if self.total_pending => {
                        // The term's own search was superseded before it landed.
                        self.state.total_pages = pages;
                        self.state.page = number.min(max_page(pages));
                        self.total_pending = false;
                    }
                    SearchKind::Page(number) => {
                        self.state.page = number;
                    }
                }
                info!(
                    term = %self.state.active_term,
                    page = self.state.page,
                    total_pages = self.state.total_pages,
                    results = self.state.results.len(),
                    "search results updated"
                );
                Ok(Completion::Applied)
            }
            Err(error) => {
                match pending.kind {
                    SearchKind::Default => {
                        warn!(error = %error, "Failed to load default images");
                        self.state.results.clear();
                        self.state.total_pages = 0;
                        self.total_pending = false;
                    }
                    SearchKind::Submit => {
                        warn!(error = %error, term = %self.state.active_term, "Search failed");
                        self.state.results.clear();
                        self.state.total_pages = 0;
                        self.state.page = 1;
                        self.total_pending = false;
                    }
                    SearchKind::Page(number) => {
                        warn!(error = %error, page = number, "Load page failed");
                    }
                }
                Err(SearchError::Upstream(error))
            }
        }
    }

    #[instrument(skip(self, pending), fields(seq = pending.seq, kind = ?pending.kind))]
    async fn run(&mut self, pending: PendingSearch) -> Result<Completion, SearchError> {
        let outcome = self.provider.search(&pending.request).await;
        self.apply(pending, outcome)
    }

    /// Loads the default term (page 1).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Upstream`] on provider failure.
    pub async fn load_default(&mut self) -> Result<Completion, SearchError> {
        let pending = self.begin_load_default();
        self.run(pending).await
    }

    /// Searches for `term` from page 1.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyQuery`] for blank terms (no state change)
    /// or [`SearchError::Upstream`] on provider failure.
    pub async fn submit(&mut self, term: &str) -> Result<Completion, SearchError> {
        let pending = self.begin_submit(term)?;
        self.run(pending).await
    }

    /// Searches for the current query input.
    ///
    /// # Errors
    ///
    /// Same as [`submit`](Self::submit).
    pub async fn submit_query_input(&mut self) -> Result<Completion, SearchError> {
        let pending = self.begin_submit_query_input()?;
        self.run(pending).await
    }

    /// Navigates to `page`; [`Completion::Ignored`] when out of range.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Upstream`] on provider failure.
    pub async fn go_to_page(&mut self, page: u32) -> Result<Completion, SearchError> {
        match self.begin_go_to_page(page) {
            Some(pending) => self.run(pending).await,
            None => Ok(Completion::Ignored),
        }
    }

    /// Navigates to the next page.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Upstream`] on provider failure.
    pub async fn next_page(&mut self) -> Result<Completion, SearchError> {
        match self.begin_next_page() {
            Some(pending) => self.run(pending).await,
            None => Ok(Completion::Ignored),
        }
    }

    /// Navigates to the previous page.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Upstream`] on provider failure.
    pub async fn prev_page(&mut self) -> Result<Completion, SearchError> {
        match self.begin_prev_page() {
            Some(pending) => self.run(pending).await,
            None => Ok(Completion::Ignored),
        }
    }
}
