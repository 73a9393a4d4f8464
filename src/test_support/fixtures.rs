//! Image fixtures and a scripted in-memory provider.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::provider::{
    Image, ImageSearchProvider, ImageUrls, ProviderError, SearchPage, SearchRequest,
};

/// Builds an image whose id encodes its position and width.
pub(crate) fn image(id: &str, width: u32) -> Image {
    Image {
        id: id.to_string(),
        urls: ImageUrls {
            small: format!("https://images.example.com/{id}?w=400"),
            regular: format!("https://images.example.com/{id}?w=1080"),
            full: format!("https://images.example.com/{id}"),
        },
        alt_description: None,
        author_name: "Test Author".to_string(),
        width,
        height: width * 2 / 3,
    }
}

/// Builds `img-<index>` images with the given widths, in order.
pub(crate) fn images(widths: &[u32]) -> Vec<Image> {
    widths
        .iter()
        .enumerate()
        .map(|(index, width)| image(&format!("img-{index}"), *width))
        .collect()
}

/// A search page with the given widths and total.
pub(crate) fn page(widths: &[u32], total: u64) -> SearchPage {
    SearchPage {
        results: images(widths),
        total,
    }
}

/// Provider-shaped JSON body for the given widths and total.
pub(crate) fn search_page_json(widths: &[u32], total: u64) -> serde_json::Value {
    let results: Vec<serde_json::Value> = widths
        .iter()
        .enumerate()
        .map(|(index, width)| {
            serde_json::json!({
                "id": format!("img-{index}"),
                "urls": {
                    "small": format!("https://images.example.com/img-{index}?w=400"),
                    "regular": format!("https://images.example.com/img-{index}?w=1080"),
                    "full": format!("https://images.example.com/img-{index}")
                },
                "alt_description": null,
                "user": {"name": "Test Author"},
                "width": width,
                "height": width * 2 / 3
            })
        })
        .collect();
    serde_json::json!({
        "total": total,
        "total_pages": total.div_ceil(12),
        "results": results
    })
}

/// Provider answering from a queue of scripted outcomes and recording requests.
#[derive(Default)]
pub(crate) struct StubProvider {
    outcomes: Mutex<VecDeque<Result<SearchPage, u16>>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl StubProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues a successful page.
    pub(crate) fn push_page(&self, page: SearchPage) -> &Self {
        self.outcomes.lock().unwrap().push_back(Ok(page));
        self
    }

    /// Queues an HTTP failure with `status`.
    pub(crate) fn push_status(&self, status: u16) -> &Self {
        self.outcomes.lock().unwrap().push_back(Err(status));
        self
    }

    /// Requests received so far.
    pub(crate) fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageSearchProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.outcomes.lock().unwrap().pop_front();
        match next {
            Some(Ok(page)) => Ok(page),
            Some(Err(status)) => Err(ProviderError::http_status("stub://search", status)),
            None => Err(ProviderError::http_status("stub://search", 503)),
        }
    }
}
