//! Client-side provider that routes every query through the proxy endpoint.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http_client::{HttpTimeouts, build_http_client};
use crate::proxy::SEARCH_ROUTE;
use crate::user_agent;

use super::{
    ImageSearchProvider, ProviderError, SearchPage, SearchRequest, decode_search_page,
    map_request_error,
};

/// Queries `GET <base>/search?q=...` on the proxy server.
///
/// `per_page` is fixed server-side; page, orientation and ordering are sent
/// as optional parameters.
#[derive(Debug, Clone)]
pub struct ProxyProvider {
    client: Client,
    endpoint: Url,
}

impl ProxyProvider {
    /// Creates a provider for the proxy at `base_url`
    /// (e.g. `http://127.0.0.1:3000` or `https://example.com/api/images`).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] for a malformed base URL, or
    /// [`ProviderError::Setup`] if HTTP client construction fails.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ProviderError> {
        let raw = format!("{}{SEARCH_ROUTE}", base_url.trim().trim_end_matches('/'));
        let endpoint = Url::parse(&raw).map_err(|_| ProviderError::invalid_url(raw.clone()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ProviderError::invalid_url(raw));
        }

        let client = build_http_client("proxy", &user_agent::default_search_user_agent(), timeouts)
            .map_err(|e| ProviderError::setup(format!("HTTP client construction failed: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// The full search endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub(crate) fn request_url(&self, request: &SearchRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &request.query)
                .append_pair("page", &request.page.to_string())
                .append_pair("orientation", request.orientation.as_str());
            if let Some(order_by) = request.order_by {
                pairs.append_pair("order_by", order_by.as_str());
            }
        }
        url
    }
}

#[async_trait]
impl ImageSearchProvider for ProxyProvider {
    fn name(&self) -> &'static str {
        "proxy"
    }

    #[instrument(skip(self, request), fields(provider = "proxy", query = %request.query, page = request.page))]
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ProviderError> {
        let url = self.request_url(request);
        let url_string = url.to_string();

        debug!(proxy_url = %url_string, "Calling search proxy");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_request_error(&url_string, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Search proxy returned error status");
            return Err(ProviderError::http_status(url_string, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_request_error(&url_string, e))?;
        decode_search_page(&url_string, &body)
    }
}
