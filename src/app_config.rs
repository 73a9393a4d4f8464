//! Application configuration: TOML file defaults merged with CLI overrides.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use imagesearch_core::HttpTimeouts;
use serde::Deserialize;
use url::Url;

/// Proxy base URL used when nothing else is configured.
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000";

/// Filename prefix for downloads.
pub const DEFAULT_PROVIDER_LABEL: &str = "unsplash";

/// TOML-backed file configuration. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Base URL of the search proxy.
    pub proxy_url: Option<String>,
    /// Directory downloads are saved into.
    pub output_dir: Option<PathBuf>,
    /// Filename prefix for downloads.
    pub provider_label: Option<String>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP whole-request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// Listen address for `serve`.
    pub bind: Option<SocketAddr>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(proxy_url) = self.proxy_url.as_deref() {
            validate_http_url("proxy_url", proxy_url)?;
        }
        if let Some(label) = self.provider_label.as_deref()
            && label.trim().is_empty()
        {
            bail!("Invalid config value for `provider_label`: must not be empty");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = Url::parse(value.trim())
        .with_context(|| format!("Invalid config value for `{field}`: '{value}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("Invalid config value for `{field}`: '{value}'. Expected an http(s) URL");
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    /// True when values were read from disk.
    #[must_use]
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/imagesearch/config.toml`
/// 2. `$HOME/.config/imagesearch/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("imagesearch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("imagesearch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let cfg: FileConfig = toml::from_str(raw)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Where an effective value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Default,
    ConfigFile,
    Cli,
}

impl ValueSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::ConfigFile => "config",
            Self::Cli => "cli",
        }
    }
}

/// A value together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ValueSource,
}

fn pick<T>(cli: Option<T>, file: Option<T>, default: impl FnOnce() -> T) -> Sourced<T> {
    match (cli, file) {
        (Some(value), _) => Sourced {
            value,
            source: ValueSource::Cli,
        },
        (None, Some(value)) => Sourced {
            value,
            source: ValueSource::ConfigFile,
        },
        (None, None) => Sourced {
            value: default(),
            source: ValueSource::Default,
        },
    }
}

/// Values given on the command line that override the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub proxy_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub bind: Option<SocketAddr>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub proxy_url: Sourced<String>,
    pub output_dir: Sourced<PathBuf>,
    pub provider_label: Sourced<String>,
    pub connect_timeout_secs: Sourced<u64>,
    pub read_timeout_secs: Sourced<u64>,
    pub bind: Sourced<SocketAddr>,
    pub verbosity: Sourced<VerbositySetting>,
}

impl EffectiveConfig {
    /// Merges CLI overrides over file values over defaults.
    ///
    /// # Errors
    ///
    /// Fails when a CLI-provided proxy URL is not an http(s) URL.
    pub fn resolve(cli: &CliOverrides, file: Option<&FileConfig>) -> Result<Self> {
        if let Some(proxy_url) = cli.proxy_url.as_deref() {
            validate_http_url("--proxy-url", proxy_url)?;
        }
        let file = file.cloned().unwrap_or_default();
        let default_bind = SocketAddr::from(([127, 0, 0, 1], 3000));
        let defaults = HttpTimeouts::default();

        Ok(Self {
            proxy_url: pick(cli.proxy_url.clone(), file.proxy_url, || {
                DEFAULT_PROXY_URL.to_string()
            }),
            output_dir: pick(cli.output_dir.clone(), file.output_dir, || {
                PathBuf::from(".")
            }),
            provider_label: pick(None, file.provider_label, || {
                DEFAULT_PROVIDER_LABEL.to_string()
            }),
            connect_timeout_secs: pick(None, file.connect_timeout_secs, || defaults.connect_secs),
            read_timeout_secs: pick(None, file.read_timeout_secs, || defaults.read_secs),
            bind: pick(cli.bind, file.bind, || default_bind),
            verbosity: pick(None, file.verbosity, || VerbositySetting::Default),
        })
    }

    /// HTTP timeouts for every client the command builds.
    #[must_use]
    pub fn http_timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect_secs: self.connect_timeout_secs.value,
            read_secs: self.read_timeout_secs.value,
        }
    }
}
