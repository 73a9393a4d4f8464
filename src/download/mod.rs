//! Full-resolution asset download.
//!
//! [`AssetDownloader`] fetches an image's `full` URL and hands the bytes to an
//! [`AssetSink`], the host's save primitive. Files are named
//! `<provider>-<id>.<ext>` with the extension taken from the response
//! Content-Type. Downloads never touch search state.

mod error;
mod filename;
mod sink;

pub use error::DownloadError;
pub use sink::{AssetSink, DirectorySink};

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::http_client::{HttpTimeouts, build_http_client};
use crate::provider::Image;
use crate::user_agent;

use filename::{DEFAULT_EXTENSION, asset_filename, extension_from_content_type};

/// A completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedAsset {
    /// Where the asset was written.
    pub path: PathBuf,
    /// Number of bytes written.
    pub bytes: u64,
}

/// Downloads full-resolution assets into an [`AssetSink`].
pub struct AssetDownloader {
    client: Client,
    label: String,
    sink: Arc<dyn AssetSink>,
}

impl std::fmt::Debug for AssetDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetDownloader")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl AssetDownloader {
    /// Creates a downloader naming files after `provider_label`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Setup`] if HTTP client construction fails.
    pub fn new(
        provider_label: impl Into<String>,
        sink: Arc<dyn AssetSink>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, DownloadError> {
        let client = build_http_client(
            "download",
            &user_agent::default_download_user_agent(),
            timeouts,
        )
        .map_err(|e| DownloadError::setup(format!("HTTP client construction failed: {e}")))?;

        Ok(Self {
            client,
            label: provider_label.into(),
            sink,
        })
    }

    /// Label used as the filename prefix.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fetches `image.urls.full` and saves it through the sink.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] for an invalid URL, network failure,
    /// non-success status or save failure. Nothing is saved on error.
    #[instrument(skip(self, image), fields(id = %image.id))]
    pub async fn download(&self, image: &Image) -> Result<SavedAsset, DownloadError> {
        let raw = image.urls.full.trim();
        let url = Url::parse(raw).map_err(|_| DownloadError::invalid_url(raw))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::invalid_url(raw));
        }

        debug!(url = %url, "fetching full-resolution asset");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DownloadError::from_request(raw, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "asset host returned error status");
            return Err(DownloadError::http_status(raw, status.as_u16()));
        }

        let extension = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(DEFAULT_EXTENSION, extension_from_content_type);
        let filename = asset_filename(&self.label, &image.id, extension);

        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::from_request(raw, e))?;
        let path = self.sink.save(&filename, &body).await?;

        info!(path = %path.display(), bytes = body.len(), "Downloaded image");
        Ok(SavedAsset {
            path,
            bytes: body.len() as u64,
        })
    }
}
