//! Shared User-Agent strings for provider, proxy and asset HTTP clients.
//!
//! Single source for project URL and UA format so search and download
//! traffic stay consistent and easy to update.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/iamtusharmaurya/image-searcher";

/// Default User-Agent for search requests (client and proxy side).
#[must_use]
pub(crate) fn default_search_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("imagesearch/{version} (search; +{PROJECT_UA_URL})")
}

/// Default User-Agent for full-resolution asset downloads.
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("imagesearch/{version} (download; +{PROJECT_UA_URL})")
}
