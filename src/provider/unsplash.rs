//! Unsplash search API client.
//!
//! [`UnsplashProvider`] holds the access key and is only meant to run
//! server-side, behind the proxy endpoint. Client code uses
//! [`ProxyProvider`](super::ProxyProvider) instead.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http_client::{HttpTimeouts, build_http_client};
use crate::user_agent;

use super::{
    ImageSearchProvider, ProviderError, SearchPage, SearchRequest, decode_search_page,
    map_request_error,
};

/// Default Unsplash API base URL.
const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// Search endpoint path, relative to the base URL.
const SEARCH_PATH: &str = "/search/photos";

/// API version pinned through the `Accept-Version` header.
const API_VERSION: &str = "v1";

/// Raw provider answer, kept verbatim for pass-through by the proxy.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    /// Request URL (without credential).
    pub url: String,
    /// HTTP status code returned by the provider.
    pub status: u16,
    /// Provider `Content-Type`, if any.
    pub content_type: Option<String>,
    /// Unmodified response body.
    pub body: Vec<u8>,
}

impl UpstreamReply {
    /// True for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Queries the Unsplash `search/photos` endpoint.
///
/// The key travels in the `Authorization: Client-ID <key>` header, never in
/// the URL, so it does not leak into logs or error messages.
pub struct UnsplashProvider {
    client: Client,
    base_url: String,
    access_key: String,
}

impl UnsplashProvider {
    /// Creates a provider against the public Unsplash API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Setup`] if the key is blank or contains control
    /// characters, or if HTTP client construction fails.
    pub fn new(access_key: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, ProviderError> {
        Self::build(access_key.into(), DEFAULT_BASE_URL.to_string(), timeouts)
    }

    /// Creates a provider with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_base_url(
        access_key: impl Into<String>,
        base_url: impl Into<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, ProviderError> {
        Self::build(access_key.into(), base_url.into(), timeouts)
    }

    fn build(
        access_key: String,
        base_url: String,
        timeouts: HttpTimeouts,
    ) -> Result<Self, ProviderError> {
        let access_key = access_key.trim().to_string();
        if access_key.is_empty() {
            return Err(ProviderError::setup("Unsplash access key is empty"));
        }
        if access_key.chars().any(char::is_control) {
            return Err(ProviderError::setup(
                "Unsplash access key contains invalid control characters",
            ));
        }

        let client = build_http_client(
            "unsplash",
            &user_agent::default_search_user_agent(),
            timeouts,
        )
        .map_err(|e| ProviderError::setup(format!("HTTP client construction failed: {e}")))?;

        Ok(Self {
            client,
            base_url,
            access_key,
        })
    }

    /// Builds the search URL for `request`.
    pub(crate) fn search_url(&self, request: &SearchRequest) -> Result<Url, ProviderError> {
        let raw = format!("{}{SEARCH_PATH}", self.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&raw).map_err(|_| ProviderError::invalid_url(raw.clone()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("query", &request.query)
                .append_pair("page", &request.page.to_string())
                .append_pair("per_page", &request.per_page.to_string())
                .append_pair("orientation", request.orientation.as_str());
            if let Some(order_by) = request.order_by {
                pairs.append_pair("order_by", order_by.as_str());
            }
        }
        Ok(url)
    }

    /// Sends the request and returns the provider's status and body untouched.
    ///
    /// Non-2xx statuses are NOT errors here; the proxy relays them verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the provider cannot be reached or the
    /// body cannot be read.
    #[instrument(skip(self, request), fields(provider = "unsplash", query = %request.query, page = request.page))]
    pub async fn forward(&self, request: &SearchRequest) -> Result<UpstreamReply, ProviderError> {
        let url = self.search_url(request)?;
        let url_string = url.to_string();

        debug!(api_url = %url_string, "Calling Unsplash API");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Client-ID {}", self.access_key))
            .header("Accept-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Unsplash API request failed");
                map_request_error(&url_string, e)
            })?;

        let status = response.status().as_u16();
        if let Some(remaining) = response.headers().get("x-ratelimit-remaining") {
            debug!(rate_limit_remaining = ?remaining, "Unsplash rate limit");
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| map_request_error(&url_string, e))?
            .to_vec();

        debug!(status, bytes = body.len(), "Unsplash API responded");

        Ok(UpstreamReply {
            url: url_string,
            status,
            content_type,
            body,
        })
    }
}

impl std::fmt::Debug for UnsplashProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsplashProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ImageSearchProvider for UnsplashProvider {
    fn name(&self) -> &'static str {
        "unsplash"
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ProviderError> {
        let reply = self.forward(request).await?;
        if !reply.is_success() {
            warn!(status = reply.status, "Unsplash API returned error status");
            return Err(ProviderError::http_status(reply.url, reply.status));
        }
        decode_search_page(&reply.url, &reply.body)
    }
}
