//! Browse command handler: interactive search loop over stdin.

use std::sync::Arc;

use anyhow::{Context, Result};
use imagesearch_core::{SearchSession, SessionHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::app_config::EffectiveConfig;
use crate::output::{self, BROWSE_HELP, LoadingSpinner};

use super::{build_controller, build_downloader};

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseInput {
    Next,
    Prev,
    GoTo(u32),
    Download(usize),
    Help,
    Quit,
    Search(String),
    Blank,
    Invalid(String),
}

fn parse_browse_line(line: &str) -> BrowseInput {
    let line = line.trim();
    if line.is_empty() {
        return BrowseInput::Blank;
    }
    let Some(command) = line.strip_prefix(':') else {
        return BrowseInput::Search(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next();
    match (name, arg) {
        ("n" | "next", None) => BrowseInput::Next,
        ("p" | "prev", None) => BrowseInput::Prev,
        ("q" | "quit", None) => BrowseInput::Quit,
        ("h" | "help", None) => BrowseInput::Help,
        ("g" | "go", Some(value)) => value
            .parse::<u32>()
            .map_or_else(|_| BrowseInput::Invalid(format!("Not a page number: {value}")), BrowseInput::GoTo),
        ("d" | "download", Some(value)) => match value.parse::<usize>() {
            Ok(position) if position >= 1 => BrowseInput::Download(position),
            _ => BrowseInput::Invalid(format!("Not a result position: {value}")),
        },
        _ => BrowseInput::Invalid(format!("Unknown command: {line}")),
    }
}

pub async fn run_browse_command(config: &EffectiveConfig, quiet: bool) -> Result<()> {
    let controller = build_controller(config)?;
    let downloader = Arc::new(build_downloader(config)?);
    let mut session = SearchSession::spawn(controller, downloader);

    println!("{BROWSE_HELP}");
    session.load_default().await?;
    show(&mut session, quiet).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let input = parse_browse_line(&line);
        debug!(?input, "browse input");
        match input {
            BrowseInput::Quit => break,
            BrowseInput::Blank => {}
            BrowseInput::Help => println!("{BROWSE_HELP}"),
            BrowseInput::Invalid(message) => println!("{message}"),
            BrowseInput::Next => {
                if session.next_page().await?.is_some() {
                    show(&mut session, quiet).await?;
                } else {
                    println!("Already on the last page.");
                }
            }
            BrowseInput::Prev => {
                if session.prev_page().await?.is_some() {
                    show(&mut session, quiet).await?;
                } else {
                    println!("Already on the first page.");
                }
            }
            BrowseInput::GoTo(page) => {
                if session.go_to_page(page).await?.is_some() {
                    show(&mut session, quiet).await?;
                } else {
                    println!("Page {page} is out of range.");
                }
            }
            BrowseInput::Search(term) => {
                session.submit(term).await?;
                show(&mut session, quiet).await?;
            }
            BrowseInput::Download(position) => download(&session, position).await,
        }
    }

    session.shutdown().await;
    Ok(())
}

async fn show(session: &mut SessionHandle, quiet: bool) -> Result<()> {
    let spinner = LoadingSpinner::start("Loading images…", quiet);
    let state = session.wait_until_idle().await;
    spinner.finish();
    let state = state?;

    if state.results.is_empty() && !state.search_performed {
        println!("Could not load images. Type a search term to try again.");
    } else {
        output::print_state(&state);
    }
    Ok(())
}

async fn download(session: &SessionHandle, position: usize) {
    let state = session.state();
    let Some(image) = state.results.get(position - 1).cloned() else {
        println!(
            "No result at position {position}; this page has {} result(s).",
            state.results.len()
        );
        return;
    };
    match session.download(image).await {
        Ok(saved) => println!("Saved {}", saved.path.display()),
        Err(e) => {
            warn!(error = %e, "Download failed");
            println!("Download failed: {e}");
        }
    }
}
