//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use tokio::net::TcpListener;

/// Provider-shaped search body: images `img-<index>` with the given widths.
pub fn search_page_json(widths: &[u32], total: u64) -> serde_json::Value {
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
                "alt_description": format!("photo {index}"),
                "user": {"name": "Test Author"},
                "width": width,
                "height": 2000
            })
        })
        .collect();
    serde_json::json!({
        "total": total,
        "total_pages": total.div_ceil(12),
        "results": results
    })
}

/// Starts the search proxy on an ephemeral port and returns its base URL.
pub async fn spawn_proxy(state: imagesearch_core::ProxyState) -> Option<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
    let addr = listener.local_addr().ok()?;
    tokio::spawn(imagesearch_core::serve_proxy(listener, state));
    Some(format!("http://{addr}"))
}
