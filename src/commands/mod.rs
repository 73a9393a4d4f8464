//! CLI command handlers.

mod browse;
mod config;
mod default;
mod search;
mod serve;

use std::sync::Arc;

use anyhow::{Context, Result};
use imagesearch_core::{AssetDownloader, DirectorySink, ProxyProvider, SearchController};

use crate::app_config::EffectiveConfig;

pub use browse::run_browse_command;
pub use config::run_config_show_command;
pub use default::run_default_command;
pub use search::run_search_command;
pub use serve::run_serve_command;

/// Builds a controller talking to the configured search proxy.
pub(crate) fn build_controller(config: &EffectiveConfig) -> Result<SearchController> {
    let provider = ProxyProvider::new(&config.proxy_url.value, config.http_timeouts())
        .with_context(|| format!("Invalid proxy URL '{}'", config.proxy_url.value))?;
    Ok(SearchController::new(Arc::new(provider)))
}

/// Builds a downloader saving into the configured output directory.
pub(crate) fn build_downloader(config: &EffectiveConfig) -> Result<AssetDownloader> {
    let sink = Arc::new(DirectorySink::new(config.output_dir.value.clone()));
    AssetDownloader::new(
        config.provider_label.value.clone(),
        sink,
        config.http_timeouts(),
    )
    .context("Failed to set up image downloader")
}
