//! Default command handler: show the default collection.

use anyhow::{Context, Result};

use crate::app_config::EffectiveConfig;
use crate::output::{self, LoadingSpinner};

use super::build_controller;

pub async fn run_default_command(config: &EffectiveConfig, quiet: bool) -> Result<()> {
    let mut controller = build_controller(config)?;

    let spinner = LoadingSpinner::start("Loading images…", quiet);
    let outcome = controller.load_default().await;
    spinner.finish();
    outcome.context("Failed to load default images")?;

    output::print_state(controller.state());
    Ok(())
}
