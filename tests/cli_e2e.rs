//! End-to-end CLI tests for the imagesearch binary.

mod support;

use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use support::search_page_json;
use support::socket_guard::start_mock_server_or_skip;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

/// Binary invocation isolated from the user's real config file.
fn imagesearch(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("imagesearch").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .env_remove("UNSPLASH_ACCESS_KEY");
    cmd
}

fn write_config(config_home: &TempDir, contents: &str) {
    let dir = config_home.path().join("imagesearch");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), contents).unwrap();
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    imagesearch(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Search, browse and download"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    imagesearch(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("imagesearch"));
}

#[test]
fn test_binary_without_subcommand_fails() {
    let home = TempDir::new().unwrap();
    imagesearch(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    imagesearch(&home)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_config_show_defaults() {
    let home = TempDir::new().unwrap();
    imagesearch(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config_file = not found (using defaults)"))
        .stdout(predicate::str::contains("proxy_url = http://127.0.0.1:3000 (default)"))
        .stdout(predicate::str::contains("bind = 127.0.0.1:3000 (default)"));
}

#[test]
fn test_config_show_merges_file_and_cli() {
    let home = TempDir::new().unwrap();
    write_config(
        &home,
        "proxy_url = \"http://localhost:4000\"\nread_timeout_secs = 45\n",
    );
    imagesearch(&home)
        .args(["--output-dir", "shots", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config_file = loaded"))
        .stdout(predicate::str::contains("proxy_url = http://localhost:4000 (config)"))
        .stdout(predicate::str::contains("read_timeout_secs = 45 (config)"))
        .stdout(predicate::str::contains("output_dir = shots (cli)"));
}

#[test]
fn test_config_unknown_key_is_rejected() {
    let home = TempDir::new().unwrap();
    write_config(&home, "concurrency = 4\n");
    imagesearch(&home)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"))
        .stderr(predicate::str::contains("concurrency"));
}

#[test]
fn test_search_blank_term_fails_without_network() {
    let home = TempDir::new().unwrap();
    imagesearch(&home)
        .args(["-q", "--proxy-url", "http://127.0.0.1:9", "search", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("search term is empty"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_prints_ranked_grid_and_pagination() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "lakes 4k high resolution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(&[1920, 4000], 30)))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = imagesearch(&home);
    cmd.args(["-q", "--proxy-url", &server.uri(), "search", "lakes"]);
    let assert = tokio::task::spawn_blocking(move || cmd.assert()).await.unwrap();

    assert
        .success()
        .stdout(predicate::str::contains(" 1. photo 1  4000x2000 [4K]  by Test Author"))
        .stdout(predicate::str::contains(" 2. photo 0  1920x2000  by Test Author"))
        .stdout(predicate::str::contains("Page 1 of 3"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_with_no_results_prints_empty_message() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(&[], 0)))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = imagesearch(&home);
    cmd.args(["-q", "--proxy-url", &server.uri(), "search", "qwxzv"]);
    let assert = tokio::task::spawn_blocking(move || cmd.assert()).await.unwrap();

    assert.success().stdout(predicate::str::contains(
        "No images found for \"qwxzv\". Try a different search term.",
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_provider_failure_prints_empty_message_and_fails() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({"errors": ["boom"]})))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = imagesearch(&home);
    cmd.args(["-q", "--proxy-url", &server.uri(), "search", "lakes"]);
    let assert = tokio::task::spawn_blocking(move || cmd.assert()).await.unwrap();

    assert
        .failure()
        .stdout(predicate::str::contains(
            "No images found for \"lakes\". Try a different search term.",
        ))
        .stderr(predicate::str::contains("Search for \"lakes\" failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_download_saves_into_output_dir() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let body = serde_json::json!({
        "total": 1,
        "results": [{
            "id": "Zx9",
            "urls": {
                "small": format!("{}/small/Zx9", server.uri()),
                "regular": format!("{}/regular/Zx9", server.uri()),
                "full": format!("{}/full/Zx9", server.uri())
            },
            "alt_description": "red canyon",
            "user": {"name": "Photographer"},
            "width": 5000,
            "height": 3000
        }]
    });
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/full/Zx9"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(b"png".to_vec()),
        )
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let out_dir = out.path().to_path_buf();
    let mut cmd = imagesearch(&home);
    cmd.arg("-q")
        .arg("--proxy-url")
        .arg(server.uri())
        .arg("--output-dir")
        .arg(&out_dir)
        .args(["search", "canyon", "--download", "1"]);
    let assert = tokio::task::spawn_blocking(move || cmd.assert()).await.unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("Saved"))
        .stdout(predicate::str::contains("unsplash-Zx9.png"));
    assert_eq!(std::fs::read(out_dir.join("unsplash-Zx9.png")).unwrap(), b"png");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_browse_reads_commands_from_stdin() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "waterfall nature 4k high resolution"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(&[100], 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "glacier 4k high resolution"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(&[100, 200], 24)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "glacier 4k high resolution"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page_json(&[300], 24)))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let mut cmd = imagesearch(&home);
    cmd.args(["-q", "--proxy-url", &server.uri(), "browse"])
        .write_stdin("glacier\n:n\n:n\n:q\n");
    let assert = tokio::task::spawn_blocking(move || cmd.assert()).await.unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("Page 1 of 2"))
        .stdout(predicate::str::contains("Page 2 of 2"))
        .stdout(predicate::str::contains("Already on the last page."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_serve_without_key_answers_500() {
    let Ok(listener) = std::net::TcpListener::bind("127.0.0.1:0") else {
        return;
    };
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let home = TempDir::new().unwrap();
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("imagesearch"))
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("UNSPLASH_ACCESS_KEY")
        .args(["-q", "serve", "--bind", &addr.to_string()])
        .stdout(std::process::Stdio::null())
        .spawn()
        .unwrap();

    let url = format!("http://{addr}/search?q=lakes");
    let mut response = None;
    for _ in 0..50 {
        if let Ok(ok) = reqwest::get(&url).await {
            response = Some(ok);
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let _ = child.kill();
    let _ = child.wait();

    let response = response.expect("proxy server did not start");
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"error": "Unsplash key not configured on server"})
    );
}
