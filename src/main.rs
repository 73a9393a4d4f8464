//! CLI entry point for the imagesearch tool.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod app_config;
mod cli;
mod commands;
mod output;

use app_config::{CliOverrides, EffectiveConfig, VerbositySetting, load_default_file_config};
use cli::{Cli, Command, ConfigAction};

/// Default log filter.
///
/// Priority: RUST_LOG env var (applied by the caller) > quiet flag > verbose
/// flag > config verbosity > info.
fn default_log_level(verbose: u8, quiet: bool, config: VerbositySetting) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => match config {
            VerbositySetting::Default => "info",
            VerbositySetting::Verbose => "debug",
            VerbositySetting::Debug => "trace",
            VerbositySetting::Quiet => "error",
        },
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    let loaded = load_default_file_config()?;
    let overrides = CliOverrides {
        proxy_url: cli.proxy_url.clone(),
        output_dir: cli.output_dir.clone(),
        bind: match &cli.command {
            Command::Serve(args) => args.bind,
            _ => None,
        },
    };
    let effective = EffectiveConfig::resolve(&overrides, loaded.config.as_ref())?;

    init_tracing(default_level_for(&cli, &effective));
    debug!(?cli, "CLI arguments parsed");

    let quiet = cli.quiet || effective.verbosity.value == VerbositySetting::Quiet;
    match &cli.command {
        Command::Default => commands::run_default_command(&effective, quiet).await,
        Command::Search(args) => commands::run_search_command(args, &effective, quiet).await,
        Command::Browse => commands::run_browse_command(&effective, quiet).await,
        Command::Serve(args) => commands::run_serve_command(args, &effective).await,
        Command::Config {
            action: ConfigAction::Show,
        } => commands::run_config_show_command(&loaded, &effective),
    }
}

fn default_level_for(cli: &Cli, effective: &EffectiveConfig) -> &'static str {
    default_log_level(cli.verbose, cli.quiet, effective.verbosity.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level_precedence() {
        assert_eq!(default_log_level(0, false, VerbositySetting::Default), "info");
        assert_eq!(default_log_level(2, true, VerbositySetting::Debug), "error");
        assert_eq!(default_log_level(1, false, VerbositySetting::Quiet), "debug");
        assert_eq!(default_log_level(3, false, VerbositySetting::Default), "trace");
        assert_eq!(default_log_level(0, false, VerbositySetting::Verbose), "debug");
        assert_eq!(default_log_level(0, false, VerbositySetting::Quiet), "error");
    }
}
