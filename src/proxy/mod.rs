//! Server-side search proxy.
//!
//! `GET /search?q=<term>` forwards to the provider with the server-held
//! credential and returns the provider's status and JSON body verbatim, so
//! the key never reaches a client. Requests default to 12 results per page
//! and squarish orientation; `page`, `orientation` and `order_by` may be
//! supplied to override those, `per_page` never.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::provider::{OrderBy, Orientation, SearchRequest, UnsplashProvider};

/// Route served by [`router`].
pub const SEARCH_ROUTE: &str = "/search";

const MISSING_TERM: &str = "Missing search term";
const KEY_NOT_CONFIGURED: &str = "Unsplash key not configured on server";
const UPSTREAM_FAILED: &str = "Upstream request failed";

/// Shared proxy state: the credential-holding provider, if configured.
#[derive(Debug, Clone, Default)]
pub struct ProxyState {
    upstream: Option<Arc<UnsplashProvider>>,
}

impl ProxyState {
    /// State forwarding to `upstream`.
    #[must_use]
    pub fn new(upstream: UnsplashProvider) -> Self {
        Self {
            upstream: Some(Arc::new(upstream)),
        }
    }

    /// State with no credential; every valid request answers 500.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { upstream: None }
    }

    /// True when a provider credential is available.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.upstream.is_some()
    }
}

/// Raw query parameters; values are parsed leniently.
#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    q: Option<String>,
    page: Option<String>,
    orientation: Option<String>,
    order_by: Option<String>,
}

impl SearchParams {
    /// Builds the provider request, or `None` when the term is blank.
    fn to_request(&self) -> Option<SearchRequest> {
        let term = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())?;

        let mut request = SearchRequest::new(term);
        if let Some(page) = self.page.as_deref().and_then(|p| p.trim().parse::<u32>().ok()) {
            request = request.with_page(page);
        }
        if let Some(orientation) = self.orientation.as_deref().and_then(parse_orientation) {
            request = request.with_orientation(orientation);
        }
        if let Some(order_by) = self.order_by.as_deref().and_then(parse_order_by) {
            request = request.with_order_by(order_by);
        }
        Some(request)
    }
}

fn parse_orientation(value: &str) -> Option<Orientation> {
    match value.trim().to_ascii_lowercase().as_str() {
        "landscape" => Some(Orientation::Landscape),
        "portrait" => Some(Orientation::Portrait),
        "squarish" => Some(Orientation::Squarish),
        _ => None,
    }
}

fn parse_order_by(value: &str) -> Option<OrderBy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "popular" => Some(OrderBy::Popular),
        "relevant" => Some(OrderBy::Relevant),
        "latest" => Some(OrderBy::Latest),
        _ => None,
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Builds the proxy router.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(SEARCH_ROUTE, get(search))
        .with_state(state)
}

async fn search(
    State(state): State<ProxyState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            debug!(error = %rejection, "rejecting malformed query string");
            return error_response(StatusCode::BAD_REQUEST, MISSING_TERM);
        }
    };
    let Some(request) = params.to_request() else {
        debug!("rejecting search without term");
        return error_response(StatusCode::BAD_REQUEST, MISSING_TERM);
    };

    let Some(upstream) = state.upstream else {
        error!("search requested but no Unsplash access key is configured");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, KEY_NOT_CONFIGURED);
    };

    match upstream.forward(&request).await {
        Ok(reply) => {
            let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            if !reply.is_success() {
                warn!(status = reply.status, "provider returned error status");
            }
            let content_type = reply
                .content_type
                .unwrap_or_else(|| "application/json".to_string());
            (status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
        }
        Err(e) => {
            warn!(error = %e, "provider unreachable");
            error_response(StatusCode::BAD_GATEWAY, UPSTREAM_FAILED)
        }
    }
}

/// Serves the proxy on `listener` until the task is cancelled.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(listener: TcpListener, state: ProxyState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, configured = state.is_configured(), "search proxy listening");
    }
    axum::serve(listener, router(state)).await
}
