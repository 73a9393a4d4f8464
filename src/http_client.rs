//! Shared HTTP client construction policy.
//!
//! Provider, proxy upstream and asset download clients are all built here so
//! they stay consistent on timeouts, user-agent, compression and proxy
//! compatibility.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

/// Default HTTP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total request timeout.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Connect and read timeouts applied to every client built by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout in seconds.
    pub connect_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

/// Builds an HTTP client using shared project policy.
///
/// `purpose` is used only for logging (e.g. the proxy panic warning), not in
/// the User-Agent header.
///
/// # Errors
///
/// Returns the builder error when client construction fails.
pub(crate) fn build_http_client(
    purpose: &str,
    user_agent: &str,
    timeouts: HttpTimeouts,
) -> Result<Client, reqwest::Error> {
    match try_build_client(user_agent, timeouts, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Restricted sandboxes can panic when querying system proxy
            // settings; fall back to env-proxy only.
            warn!(
                purpose,
                "HTTP client hit system proxy panic; using env-proxy fallback builder"
            );
            match try_build_client(user_agent, timeouts, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Build(error)) => Err(error),
                Err(BuildClientFailure::Panic) => {
                    // Last resort: a builder with no proxy handling at all.
                    base_builder(user_agent, timeouts).no_proxy().build()
                }
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(error),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    user_agent: &str,
    timeouts: HttpTimeouts,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(user_agent, timeouts);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(user_agent: &str, timeouts: HttpTimeouts) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.read_secs))
        .user_agent(user_agent.to_string())
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_timeouts_default_values() {
        let timeouts = HttpTimeouts::default();
        assert_eq!(timeouts.connect_secs, 10);
        assert_eq!(timeouts.read_secs, 30);
    }

    #[test]
    fn test_build_http_client_succeeds_with_defaults() {
        let client = build_http_client("test", "imagesearch/test", HttpTimeouts::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_env_proxy_for_unknown_scheme_is_none() {
        assert!(env_proxy_for_scheme("ftp").is_none());
    }
}
