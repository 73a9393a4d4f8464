//! Error types for the search controller and session.

use thiserror::Error;

use crate::download::DownloadError;
use crate::provider::ProviderError;

/// Errors surfaced by controller and session operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Blank submission; rejected before any state change.
    #[error("search term is empty")]
    EmptyQuery,

    /// Provider failure; state has already been updated accordingly.
    #[error("search request failed: {0}")]
    Upstream(#[from] ProviderError),

    /// Asset download failure; search state is untouched.
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    /// The session task has stopped.
    #[error("search session is closed")]
    SessionClosed,
}

impl SearchError {
    /// True for the validation error raised by blank submissions.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyQuery)
    }
}
