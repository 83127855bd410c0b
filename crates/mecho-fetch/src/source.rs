use std::path::PathBuf;

use mecho_config::path::{extension_hint, file_stem};

use crate::error::SourceError;
use crate::Fetcher;

/// An image attached to an incoming message.
///
/// Transports fill in whatever they know. A local path is preferred over the
/// URL; the suggested filename is what the platform calls the image, which for
/// most chat platforms is the content digest plus an extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSource {
    pub local_path: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub suggested_filename: Option<String>,
}

/// Bytes of an image plus the extension hint for storing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    /// `.ext` from the source, empty when nothing usable was found.
    pub extension: String,
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            remote_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.suggested_filename = Some(filename.into());
        self
    }

    /// Suggested filename without its extension.
    pub fn filename_stem(&self) -> Option<&str> {
        self.suggested_filename.as_deref().and_then(file_stem)
    }

    /// Read the image: local path first, then the URL.
    ///
    /// A local path that is not a readable file falls through to the URL.
    pub async fn load<F: Fetcher + ?Sized>(&self, fetcher: &F) -> Result<ImageData, SourceError> {
        if let Some(path) = &self.local_path {
            if path.is_file() {
                let bytes = tokio::fs::read(path).await?;
                let extension = path
                    .to_str()
                    .and_then(extension_hint)
                    .unwrap_or_default();
                return Ok(ImageData { bytes, extension });
            }
            tracing::debug!(path = %path.display(), "local image path not a file, trying url");
        }

        let Some(url) = self.remote_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return Err(SourceError::Missing);
        };

        let bytes = fetcher.fetch(url).await?;
        let extension = self
            .suggested_filename
            .as_deref()
            .and_then(extension_hint)
            .or_else(|| url_extension(url))
            .unwrap_or_default();
        Ok(ImageData { bytes, extension })
    }
}

/// Extension of the URL's last path segment, ignoring query and fragment.
fn url_extension(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.last()?;
    extension_hint(last)
}
