//! Query augmentation.
//!
//! Every browse query is biased toward high-resolution landscape photography:
//! the term gets a fixed suffix and the request is popularity-ordered,
//! landscape-only, 12 per page.

use crate::provider::{OrderBy, Orientation, SearchRequest};

use super::PAGE_SIZE;

/// Term searched at session start and used when no term is active.
pub const DEFAULT_TERM: &str = "waterfall nature";

/// Literal suffix appended to every browse term.
pub const QUERY_SUFFIX: &str = " 4k high resolution";

/// Returns the trimmed term, or [`DEFAULT_TERM`] when it is blank.
#[must_use]
pub fn effective_term(term: &str) -> &str {
    let trimmed = term.trim();
    if trimmed.is_empty() { DEFAULT_TERM } else { trimmed }
}

/// Appends [`QUERY_SUFFIX`] to the trimmed term.
#[must_use]
pub fn augment_query(term: &str) -> String {
    format!("{}{QUERY_SUFFIX}", term.trim())
}

/// Builds the landscape, popularity-ordered request for `term` at `page`.
#[must_use]
pub fn browse_request(term: &str, page: u32) -> SearchRequest {
    let mut request = SearchRequest::new(augment_query(effective_term(term)))
        .with_page(page)
        .with_orientation(Orientation::Landscape)
        .with_order_by(OrderBy::Popular);
    request.per_page = PAGE_SIZE;
    request
}
