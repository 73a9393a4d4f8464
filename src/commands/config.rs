//! Config command handlers: show effective configuration.

use std::fmt::Display;

use anyhow::Result;

use crate::app_config::{EffectiveConfig, LoadedConfig, Sourced};

fn line<T: Display>(key: &str, value: &Sourced<T>) -> String {
    format!("{key} = {} ({})", value.value, value.source.as_str())
}

pub(crate) fn render_config_lines(loaded: &LoadedConfig, effective: &EffectiveConfig) -> Vec<String> {
    let resolved_path = loaded.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    let verbosity = Sourced {
        value: effective.verbosity.value.as_str(),
        source: effective.verbosity.source,
    };
    let output_dir = Sourced {
        value: effective.output_dir.value.display(),
        source: effective.output_dir.source,
    };

    vec![
        format!("config_path = {resolved_path}"),
        format!(
            "config_file = {}",
            if loaded.loaded_from_file() {
                "loaded"
            } else {
                "not found (using defaults)"
            }
        ),
        line("proxy_url", &effective.proxy_url),
        line("output_dir", &output_dir),
        line("provider_label", &effective.provider_label),
        line("connect_timeout_secs", &effective.connect_timeout_secs),
        line("read_timeout_secs", &effective.read_timeout_secs),
        line("bind", &effective.bind),
        line("verbosity", &verbosity),
    ]
}

pub fn run_config_show_command(loaded: &LoadedConfig, effective: &EffectiveConfig) -> Result<()> {
    for line in render_config_lines(loaded, effective) {
        println!("{line}");
    }
    Ok(())
}
