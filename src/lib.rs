//! Image Search Core Library
//!
//! This library provides the core functionality for the imagesearch tool,
//! which turns keyword queries against an image-search provider into a
//! stable, paginated, quality-prioritized result set and downloads the
//! full-resolution assets.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`provider`] - Provider contract, Unsplash client and proxy client
//! - [`search`] - Ranking, pagination and query construction (pure functions)
//! - [`controller`] - Search state machine and the message-driven session task
//! - [`download`] - Full-resolution asset download and host save primitive
//! - [`proxy`] - Server-side proxy endpoint hiding the provider credential

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod controller;
pub mod download;
pub(crate) mod http_client;
pub mod provider;
pub mod proxy;
pub mod search;
#[cfg(test)]
pub(crate) mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use controller::{
    Completion, PendingSearch, SearchController, SearchError, SearchKind, SearchSession,
    SearchState, SessionCommand, SessionHandle,
};
pub use download::{AssetDownloader, AssetSink, DirectorySink, DownloadError, SavedAsset};
pub use http_client::HttpTimeouts;
pub use provider::{
    Image, ImageSearchProvider, ImageUrls, OrderBy, Orientation, ProviderError, ProxyProvider,
    SearchPage, SearchRequest, UnsplashProvider,
};
pub use proxy::{ProxyState, router as proxy_router, serve as serve_proxy};
pub use search::{
    DEFAULT_TERM, HIGH_RESOLUTION_MIN_WIDTH, PAGE_SIZE, QUERY_SUFFIX, augment_query, check_page,
    max_page, rank, total_pages,
};
