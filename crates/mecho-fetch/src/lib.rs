//! # mecho-fetch
//!
//! Turning an image attached to a chat message into bytes.
//!
//! The catalog never talks to the network itself. It is handed an
//! [`ImageSource`] and a [`Fetcher`]; the source decides whether to read a local
//! file or ask the fetcher for a URL.

mod error;
mod http;
mod source;

pub use error::{FetchError, SourceError};
pub use http::HttpFetcher;
pub use source::{ImageData, ImageSource};

use async_trait::async_trait;

/// The "fetch bytes from URL" capability.
///
/// Implementations must bound the total time spent and report non-success
/// statuses as [`FetchError::Status`]. No retries.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
