//! Pure search policy: result ranking, pagination and query construction.
//!
//! Nothing in this module performs I/O; the controller composes these
//! functions around provider calls.

mod paginator;
mod query;
mod ranker;

pub use paginator::{check_page, max_page, total_pages};
pub use query::{DEFAULT_TERM, QUERY_SUFFIX, augment_query, browse_request, effective_term};
pub use ranker::{HIGH_RESOLUTION_MIN_WIDTH, is_high_resolution, rank};

/// Fixed number of images per navigation page.
pub const PAGE_SIZE: u32 = 12;
