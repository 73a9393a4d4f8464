//! High-resolution-first result ordering.

use crate::provider::Image;

/// Minimum width (4K UHD) for an image to be promoted to the front.
pub const HIGH_RESOLUTION_MIN_WIDTH: u32 = 3840;

/// True when the image is at least 4K wide.
#[must_use]
pub fn is_high_resolution(image: &Image) -> bool {
    image.width >= HIGH_RESOLUTION_MIN_WIDTH
}

/// Moves high-resolution images ahead of the rest and caps to `page_size`.
///
/// This is a stable partition, not a sort: the provider's relevance order is
/// kept inside each group.
#[must_use]
pub fn rank(raw: Vec<Image>, page_size: usize) -> Vec<Image> {
    let (mut ranked, rest): (Vec<Image>, Vec<Image>) =
        raw.into_iter().partition(is_high_resolution);
    ranked.extend(rest);
    ranked.truncate(page_size);
    ranked
}
