//! Page count derivation and navigation bounds.

/// Number of pages needed to show `total_matches` at `page_size` per page.
///
/// Zero matches (or a zero page size) yields zero pages. Saturates at
/// `u32::MAX` for absurd totals.
#[must_use]
pub fn total_pages(total_matches: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total_matches.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// Highest page the `page` field may hold: `max(total_pages, 1)`.
#[must_use]
pub fn max_page(total_pages: u32) -> u32 {
    total_pages.max(1)
}

/// Validates a navigation request.
///
/// Returns `Some(requested)` only when `1 <= requested <= total_pages`.
/// Out-of-range requests are rejected, never clamped.
#[must_use]
pub fn check_page(requested: u32, total_pages: u32) -> Option<u32> {
    (1..=total_pages).contains(&requested).then_some(requested)
}
