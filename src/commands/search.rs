//! Search command handler: one page of results, optional downloads.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use imagesearch_core::{Completion, Image};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::app_config::EffectiveConfig;
use crate::cli::SearchArgs;
use crate::output::{self, LoadingSpinner};

use super::{build_controller, build_downloader};

pub async fn run_search_command(
    args: &SearchArgs,
    config: &EffectiveConfig,
    quiet: bool,
) -> Result<()> {
    let mut controller = build_controller(config)?;

    let spinner = LoadingSpinner::start(format!("Searching for \"{}\"…", args.term.trim()), quiet);
    let outcome = controller.submit(&args.term).await;
    spinner.finish();
    if outcome.is_err() {
        // Shows the empty-results message for provider failures.
        output::print_state(controller.state());
    }
    outcome.with_context(|| format!("Search for \"{}\" failed", args.term.trim()))?;

    if args.page > 1 {
        let spinner = LoadingSpinner::start(format!("Loading page {}…", args.page), quiet);
        let outcome = controller.go_to_page(args.page).await;
        spinner.finish();
        if outcome.with_context(|| format!("Loading page {} failed", args.page))?
            == Completion::Ignored
        {
            warn!(
                requested = args.page,
                total_pages = controller.state().total_pages,
                "Page out of range; showing page {}",
                controller.state().page
            );
        }
    }

    output::print_state(controller.state());

    if args.download.is_empty() {
        return Ok(());
    }
    let selected = select_results(&controller.state().results, &args.download)?;
    download_all(config, selected).await
}

fn select_results(results: &[Image], positions: &[u8]) -> Result<Vec<Image>> {
    positions
        .iter()
        .map(|&position| {
            let index = usize::from(position).saturating_sub(1);
            match results.get(index) {
                Some(image) => Ok(image.clone()),
                None => bail!(
                    "No result at position {position}; this page has {} result(s)",
                    results.len()
                ),
            }
        })
        .collect()
}

async fn download_all(config: &EffectiveConfig, images: Vec<Image>) -> Result<()> {
    let downloader = Arc::new(build_downloader(config)?);
    let mut tasks = JoinSet::new();
    for image in images {
        let downloader = Arc::clone(&downloader);
        tasks.spawn(async move { downloader.download(&image).await });
    }

    let mut failed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined.context("download task panicked")? {
            Ok(saved) => {
                info!(bytes = saved.bytes, "Saved");
                println!("Saved {}", saved.path.display());
            }
            Err(e) => {
                warn!(error = %e, "Download failed");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} download(s) failed");
    }
    Ok(())
}
