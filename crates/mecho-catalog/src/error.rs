use std::io;
use std::path::PathBuf;

use mecho_cas::CasError;
use thiserror::Error;

/// Errors surfaced by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Blob directory read/write/delete failed.
    #[error("storage error: {0}")]
    Storage(#[from] CasError),

    /// The id or alias does not resolve to an indexed blob.
    #[error("not found: {0}")]
    NotFound(String),

    /// The alias can never be resolved as given.
    #[error("invalid alias {alias:?}: {reason}")]
    InvalidAlias { alias: String, reason: &'static str },

    /// A table could not be written to disk. In-memory state is kept.
    #[error("failed to persist {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
