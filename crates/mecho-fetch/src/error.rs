use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors from retrieving a remote image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The whole request did not finish within the allowed duration.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A network or transport-level error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The URL could not be parsed or uses an unsupported scheme.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Errors from turning an image reference into bytes.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Neither a readable local path nor a URL was available.
    #[error("image has no path or url to read from")]
    Missing,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to read local image: {0}")]
    Io(#[from] io::Error),
}
