//! # mecho-catalog
//!
//! The catalog of stored memes: an index of canonical ids to blob files, an
//! alias table on top of it, and the per-user await windows used to capture the
//! next image a user sends.
//!
//! ## Files
//!
//! ```text
//! <data_dir>/
//! ├── index.json   # {"<ID>": "<ID>.png"}
//! ├── alias.json   # {"cat": "<ID>"}
//! └── memes/       # blobs, see mecho-cas
//! ```
//!
//! The index is authoritative. The blob directory is only scanned to recover a
//! missing or corrupt index, or on an explicit reload.

mod alias;
mod await_state;
mod catalog;
mod error;
mod index;
mod persist;

pub use alias::AliasTable;
pub use await_state::{AwaitKey, AwaitState, AwaitStatus};
pub use catalog::{Catalog, Description, ListEntry, ReloadReport};
pub use error::{CatalogError, Result};
pub use index::Index;

pub use mecho_cas::CanonicalId;
