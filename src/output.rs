//! CLI output formatting and display helpers.

use std::io::IsTerminal;
use std::time::Duration;

use imagesearch_core::{Image, SearchState};
use indicatif::{ProgressBar, ProgressStyle};

/// Hint printed when `browse` starts.
pub const BROWSE_HELP: &str =
    "Type a search term, or :n next, :p previous, :g N go to page, :d INDEX download, :q quit";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

fn render_row(position: usize, image: &Image) -> String {
    let badge = if imagesearch_core::search::is_high_resolution(image) {
        " [4K]"
    } else {
        ""
    };
    format!(
        "{position:>2}. {}  {}x{}{badge}  by {}",
        image.caption(),
        image.width,
        image.height,
        image.author_name
    )
}

/// Renders the result grid, empty message and pagination line for `state`.
pub fn render_state(state: &SearchState, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if state.shows_empty_message() {
        lines.push(truncate_to_width(&state.empty_message(), width));
        return lines;
    }

    for (index, image) in state.results.iter().enumerate() {
        lines.push(truncate_to_width(&render_row(index + 1, image), width));
    }

    if state.shows_pagination() {
        let prev = if state.can_go_prev() { "< prev" } else { "      " };
        let next = if state.can_go_next() { "next >" } else { "" };
        lines.push(
            format!(
                "{prev}  Page {} of {}  {next}",
                state.page, state.total_pages
            )
            .trim_end()
            .to_string(),
        );
    }
    lines
}

/// Prints [`render_state`] to stdout.
pub fn print_state(state: &SearchState) {
    for line in render_state(state, terminal_width()) {
        println!("{line}");
    }
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_use_spinner(stderr_is_terminal: bool, quiet: bool, dumb_terminal: bool) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

/// Spinner shown on stderr while a search is loading.
pub struct LoadingSpinner {
    bar: Option<ProgressBar>,
}

impl LoadingSpinner {
    /// Starts a spinner with `message` when the terminal allows it.
    pub fn start(message: impl Into<String>, quiet: bool) -> Self {
        let enabled = should_use_spinner(std::io::stderr().is_terminal(), quiet, is_dumb_terminal());
        if !enabled {
            return Self { bar: None };
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    /// Removes the spinner line.
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
