//! Serve command handler: run the search proxy.

use anyhow::{Context, Result};
use imagesearch_core::{ProxyState, UnsplashProvider, serve_proxy};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::app_config::EffectiveConfig;
use crate::cli::ServeArgs;

/// Environment variable holding the provider credential.
pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

fn access_key_from_env() -> Option<String> {
    std::env::var(ACCESS_KEY_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn build_state(args: &ServeArgs, config: &EffectiveConfig) -> Result<ProxyState> {
    let Some(key) = access_key_from_env() else {
        warn!(
            "{ACCESS_KEY_ENV} is not set; searches will answer 500 until it is configured"
        );
        return Ok(ProxyState::unconfigured());
    };

    let timeouts = config.http_timeouts();
    let provider = match args.upstream_url.as_deref() {
        Some(base_url) => UnsplashProvider::with_base_url(key, base_url, timeouts),
        None => UnsplashProvider::new(key, timeouts),
    }
    .context("Failed to set up Unsplash client")?;
    Ok(ProxyState::new(provider))
}

pub async fn run_serve_command(args: &ServeArgs, config: &EffectiveConfig) -> Result<()> {
    let state = build_state(args, config)?;
    let addr = config.bind.value;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local = listener.local_addr().unwrap_or(addr);
    println!("Search proxy listening on http://{local}/search");

    tokio::select! {
        served = serve_proxy(listener, state) => served.context("Search proxy stopped")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Shutting down search proxy");
        }
    }
    Ok(())
}
