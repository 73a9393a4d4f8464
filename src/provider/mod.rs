//! Image-search provider contract and HTTP implementations.
//!
//! # Architecture
//!
//! - [`ImageSearchProvider`] - Async trait answering one page of a keyword query
//! - [`UnsplashProvider`] - Talks to the Unsplash API directly; holds the
//!   credential and is meant for server-side use only (the proxy endpoint)
//! - [`ProxyProvider`] - Client-side provider that routes every query through
//!   the proxy endpoint, so no credential ever reaches the client
//!
//! # Example
//!
//! ```no_run
//! use imagesearch_core::provider::{ImageSearchProvider, ProxyProvider, SearchRequest};
//! use imagesearch_core::HttpTimeouts;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ProxyProvider::new("http://127.0.0.1:3000", HttpTimeouts::default())?;
//! let page = provider.search(&SearchRequest::new("waterfall")).await?;
//! println!("{} matches", page.total);
//! # Ok(())
//! # }
//! ```

mod error;
mod proxy_client;
mod unsplash;

pub use error::ProviderError;
pub use proxy_client::ProxyProvider;
pub use unsplash::{UnsplashProvider, UpstreamReply};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::search::PAGE_SIZE;

/// Size variants of a single photograph.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageUrls {
    /// Thumbnail-sized rendition.
    pub small: String,
    /// Grid-sized rendition.
    pub regular: String,
    /// Full-resolution original.
    pub full: String,
}

/// A photograph as returned by the provider. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireImage")]
pub struct Image {
    /// Opaque provider identifier.
    pub id: String,
    /// Size variants.
    pub urls: ImageUrls,
    /// Optional human-readable caption.
    pub alt_description: Option<String>,
    /// Display name of the content owner.
    pub author_name: String,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

impl Image {
    /// Caption to show for this image, falling back to a generic label.
    #[must_use]
    pub fn caption(&self) -> &str {
        self.alt_description
            .as_deref()
            .filter(|alt| !alt.trim().is_empty())
            .unwrap_or("Unsplash image")
    }
}

#[derive(Deserialize)]
struct WireImage {
    id: String,
    urls: ImageUrls,
    #[serde(default)]
    alt_description: Option<String>,
    #[serde(default)]
    user: Option<WireUser>,
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct WireUser {
    #[serde(default)]
    name: Option<String>,
}

impl From<WireImage> for Image {
    fn from(wire: WireImage) -> Self {
        Self {
            id: wire.id,
            urls: wire.urls,
            alt_description: wire.alt_description,
            author_name: wire.user.and_then(|u| u.name).unwrap_or_default(),
            width: wire.width,
            height: wire.height,
        }
    }
}

/// One page of provider results plus the total match count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "WireSearchPage")]
pub struct SearchPage {
    /// Results in provider order.
    pub results: Vec<Image>,
    /// Total matches across all pages.
    pub total: u64,
}

#[derive(Deserialize)]
struct WireSearchPage {
    #[serde(default)]
    results: Option<Vec<Image>>,
    #[serde(default)]
    total: Option<u64>,
}

impl From<WireSearchPage> for SearchPage {
    fn from(wire: WireSearchPage) -> Self {
        Self {
            results: wire.results.unwrap_or_default(),
            total: wire.total.unwrap_or(0),
        }
    }
}

/// Photo orientation filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Squarish,
}

impl Orientation {
    /// Wire value understood by the provider.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::Squarish => "squarish",
        }
    }
}

/// Result ordering requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    Popular,
    Relevant,
    Latest,
}

impl OrderBy {
    /// Wire value understood by the provider.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::Relevant => "relevant",
            Self::Latest => "latest",
        }
    }
}

/// A single provider query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Text sent to the provider (already augmented when applicable).
    pub query: String,
    /// 1-based page index.
    pub page: u32,
    /// Results per page.
    pub per_page: u32,
    /// Orientation filter.
    pub orientation: Orientation,
    /// Ordering; `None` leaves the provider default.
    pub order_by: Option<OrderBy>,
}

impl SearchRequest {
    /// Creates a request with the proxy endpoint defaults: page 1, 12 per
    /// page, squarish orientation, provider-default ordering.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            per_page: PAGE_SIZE,
            orientation: Orientation::Squarish,
            order_by: None,
        }
    }

    /// Sets the page index (values below 1 are raised to 1).
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Sets the orientation filter.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }
}

/// Trait that all image-search providers implement.
///
/// Uses `async_trait` so controllers can hold an `Arc<dyn ImageSearchProvider>`.
#[async_trait]
pub trait ImageSearchProvider: Send + Sync {
    /// Returns the provider's name (e.g. "unsplash", "proxy").
    fn name(&self) -> &str;

    /// Fetches one page of results for the request.
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ProviderError>;
}

/// Decodes a provider JSON body into a [`SearchPage`].
pub(crate) fn decode_search_page(url: &str, body: &[u8]) -> Result<SearchPage, ProviderError> {
    serde_json::from_slice(body).map_err(|e| ProviderError::decode(url, e))
}

/// Maps a reqwest send/read failure into a [`ProviderError`] for `url`.
pub(crate) fn map_request_error(url: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout(url)
    } else {
        ProviderError::network(url, error)
    }
}
