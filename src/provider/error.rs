//! Error types for provider calls.

use thiserror::Error;

/// Errors that can occur while querying an image-search provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level error (DNS, connection refused, TLS, body read).
    #[error("network error querying {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout querying {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Provider answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Provider body could not be decoded as a search page.
    #[error("malformed response from {url}: {source}")]
    Decode {
        /// The URL whose body was malformed.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The configured endpoint is not a valid URL.
    #[error("invalid provider URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client or credential could not be configured.
    #[error("provider setup failed: {message}")]
    Setup {
        /// Human-readable reason.
        message: String,
    },
}

impl ProviderError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a setup error.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    /// Returns the HTTP status if the provider answered with one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
