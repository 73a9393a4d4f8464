//! Integration tests: client -> search proxy -> mock provider.

mod support;

use std::sync::Arc;
use std::time::Duration;

use imagesearch_core::{
    AssetDownloader, DirectorySink, HttpTimeouts, ProxyProvider, ProxyState, SearchController,
    SearchSession, UnsplashProvider,
};
use support::socket_guard::start_mock_server_or_skip;
use support::{search_page_json, spawn_proxy};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn proxy_in_front_of(upstream: &MockServer) -> Option<String> {
    let provider =
        UnsplashProvider::with_base_url("server-secret", upstream.uri(), HttpTimeouts::default())
            .unwrap();
    spawn_proxy(ProxyState::new(provider)).await
}

#[tokio::test]
async fn test_controller_through_proxy_keeps_browse_contract() {
    let Some(upstream) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(query_param("query", "fjords 4k high resolution"))
        .and(query_param("per_page", "12"))
        .and(query_param("orientation", "landscape"))
        .and(query_param("order_by", "popular"))
        .and(query_param("page", "1"))
        .and(header("authorization", "Client-ID server-secret"))
        .and(header("accept-version", "v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(&[2000, 4096], 25)))
        .expect(1)
        .mount(&upstream)
        .await;
    let Some(proxy_url) = proxy_in_front_of(&upstream).await else {
        return;
    };

    let provider = ProxyProvider::new(&proxy_url, HttpTimeouts::default()).unwrap();
    let mut controller = SearchController::new(Arc::new(provider));
    controller.submit("fjords").await.unwrap();

    let state = controller.state();
    assert_eq!(state.total_pages, 3);
    assert_eq!(state.results[0].width, 4096);
    assert_eq!(state.results[0].author_name, "Test Author");
}

#[tokio::test]
async fn test_client_requests_never_carry_credential() {
    let Some(upstream) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(&[100], 1)))
        .mount(&upstream)
        .await;
    let Some(proxy_url) = proxy_in_front_of(&upstream).await else {
        return;
    };

    let provider = ProxyProvider::new(&proxy_url, HttpTimeouts::default()).unwrap();
    let url = provider.endpoint().to_string();
    assert!(!url.contains("server-secret"));

    let mut controller = SearchController::new(Arc::new(provider));
    controller.submit("anything").await.unwrap();

    let received = upstream.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(!received[0].url.as_str().contains("server-secret"));
}

#[tokio::test]
async fn test_upstream_rate_limit_passes_through_as_failure() {
    let Some(upstream) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Rate Limit Exceeded"))
        .mount(&upstream)
        .await;
    let Some(proxy_url) = proxy_in_front_of(&upstream).await else {
        return;
    };

    let response = reqwest::get(format!("{proxy_url}/search?q=lakes")).await.unwrap();
    assert_eq!(response.status().as_u16(), 403);
    assert_eq!(response.text().await.unwrap(), "Rate Limit Exceeded");

    let provider = ProxyProvider::new(&proxy_url, HttpTimeouts::default()).unwrap();
    let mut controller = SearchController::new(Arc::new(provider));
    let err = controller.submit("lakes").await.unwrap_err();
    assert!(err.to_string().contains("403"), "{err}");
}

#[tokio::test]
async fn test_session_discards_slow_page_after_new_search() {
    let Some(upstream) = start_mock_server_or_skip().await else {
        return;
    };
    let default_query = "waterfall nature 4k high resolution";
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(query_param("query", default_query))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(&[100; 12], 36)))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(query_param("query", default_query))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_page_json(&[1, 2, 3], 36))
                .set_delay(Duration::from_millis(600)),
        )
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(query_param("query", "aurora 4k high resolution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(&[5000], 1)))
        .mount(&upstream)
        .await;
    let Some(proxy_url) = proxy_in_front_of(&upstream).await else {
        return;
    };

    let provider = ProxyProvider::new(&proxy_url, HttpTimeouts::default()).unwrap();
    let temp = TempDir::new().unwrap();
    let downloader = AssetDownloader::new(
        "unsplash",
        Arc::new(DirectorySink::new(temp.path())),
        HttpTimeouts::default(),
    )
    .unwrap();
    let mut session = SearchSession::spawn(
        SearchController::new(Arc::new(provider)),
        Arc::new(downloader),
    );

    session.load_default().await.unwrap();
    assert_eq!(session.wait_until_idle().await.unwrap().total_pages, 3);

    session.go_to_page(2).await.unwrap();
    session.submit("aurora").await.unwrap();
    let state = session.wait_until_idle().await.unwrap();
    assert_eq!(state.active_term, "aurora");
    assert_eq!(state.results[0].width, 5000);

    // Let the delayed page-2 response arrive; it must be discarded.
    tokio::time::sleep(Duration::from_millis(900)).await;
    let state = session.state();
    assert_eq!(state.active_term, "aurora");
    assert_eq!(state.page, 1);
    assert_eq!(state.total_pages, 1);
    assert_eq!(state.results.len(), 1);
    assert!(!state.loading);

    session.shutdown().await;
}
