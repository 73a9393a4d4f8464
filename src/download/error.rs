//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching or saving an asset.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The asset URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The asset URL.
        url: String,
    },

    /// Non-success response from the asset host.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The asset URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The asset URL is malformed or empty.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// File system error while saving.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Downloader construction failed.
    #[error("download setup failed: {message}")]
    Setup {
        /// What went wrong.
        message: String,
    },
}

impl DownloadError {
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

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a setup error.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    /// Maps a reqwest failure, distinguishing timeouts.
    pub(crate) fn from_request(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::network(url, source)
        }
    }
}
