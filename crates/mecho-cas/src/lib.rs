//! # mecho-cas
//!
//! Content-addressed blob storage for mecho.
//!
//! Blobs live in one flat directory, each named after the upper-case hex MD5 of
//! its content plus the extension hinted by its source:
//!
//! ```text
//! <data_dir>/memes/
//! ├── 5D41402ABC4B2A76B9719D911017C592.png
//! ├── 0CC175B9C0F1B6A831C399E269772661.gif
//! └── .0CC1...2661.gif.4242.7.tmp   # in-flight write, never indexed
//! ```
//!
//! Identical content is written once. Writes go to a hidden temp file first and
//! are renamed into place, so readers never observe a partial blob.

mod id;

pub use id::{is_id_shaped, CanonicalId, ParseIdError, ID_LEN};

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

/// Extension used when the source gives no usable hint.
pub const DEFAULT_EXTENSION: &str = ".png";

/// Per-process counter keeping concurrent temp names apart.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errors that can occur during blob store operations
#[derive(Error, Debug)]
pub enum CasError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid blob filename: {0:?}")]
    InvalidFilename(String),
}

pub type Result<T> = std::result::Result<T, CasError>;

/// Flat, content-addressed blob directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    default_extension: String,
}

impl ContentStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            default_extension: DEFAULT_EXTENSION.to_string(),
        })
    }

    /// Override the extension used for blobs whose source has no hint.
    pub fn with_default_extension(mut self, ext: &str) -> Self {
        let ext = normalize_extension(ext, DEFAULT_EXTENSION);
        self.default_extension = ext;
        self
    }

    /// Compute the canonical id of the given bytes.
    #[inline]
    pub fn compute_id(data: &[u8]) -> CanonicalId {
        CanonicalId::from_bytes(data)
    }

    /// Filename a blob with this id and extension hint is stored under.
    pub fn filename_for(&self, id: &CanonicalId, extension_hint: &str) -> String {
        format!(
            "{}{}",
            id,
            normalize_extension(extension_hint, &self.default_extension)
        )
    }

    /// Write `data` under `id`, returning the filename used.
    ///
    /// If the destination already exists nothing is rewritten. The id is trusted
    /// to match `data`; use [`ContentStore::store`] to derive it.
    #[instrument(skip(self, data), fields(len = data.len()), level = "debug")]
    pub fn write(&self, id: &CanonicalId, extension_hint: &str, data: &[u8]) -> Result<String> {
        let filename = self.filename_for(id, extension_hint);
        let path = self.root.join(&filename);

        if path.exists() {
            debug!(%filename, "blob already present");
            return Ok(filename);
        }
        if let Some(existing) = self.files_for(id)?.into_iter().next() {
            debug!(%existing, "blob already present under another extension");
            return Ok(existing);
        }

        let temp_path = self.root.join(format!(
            ".{}.{}.{}.tmp",
            filename,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let written = (|| -> io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(data)?;
            file.sync_all()
        })();
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(CasError::Io(e));
        }

        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            // Lost a race against an identical write; the content is the same.
            if path.exists() {
                return Ok(filename);
            }
            return Err(CasError::Io(e));
        }

        debug!(%filename, "blob written");
        Ok(filename)
    }

    /// Hash and write `data`, returning its id and filename.
    pub fn store(&self, data: &[u8], extension_hint: &str) -> Result<(CanonicalId, String)> {
        let id = Self::compute_id(data);
        let filename = self.write(&id, extension_hint, data)?;
        Ok((id, filename))
    }

    /// Read a blob's bytes.
    #[instrument(skip(self), level = "debug")]
    pub fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.checked_path(filename)?;
        Ok(fs::read(path)?)
    }

    /// Ensure the blob is absent. Returns whether a file was actually removed.
    #[instrument(skip(self), level = "debug")]
    pub fn delete(&self, filename: &str) -> Result<bool> {
        let path = self.checked_path(filename)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CasError::Io(e)),
        }
    }

    /// Check whether a blob file is present.
    pub fn exists(&self, filename: &str) -> bool {
        self.checked_path(filename)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Location of a blob inside the store.
    pub fn path(&self, filename: &str) -> Result<PathBuf> {
        self.checked_path(filename)
    }

    /// Get the root path of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every indexable blob directly inside the store root.
    pub fn scan(&self) -> Result<Vec<(CanonicalId, String)>> {
        scan_dir(&self.root)
    }

    /// Every blob file stored for `id`, whatever its extension.
    pub fn files_for(&self, id: &CanonicalId) -> Result<Vec<String>> {
        Ok(scan_dir(&self.root)?
            .into_iter()
            .filter(|(found, _)| found == id)
            .map(|(_, name)| name)
            .collect())
    }

    /// Reject anything that is not a single plain file name.
    fn checked_path(&self, filename: &str) -> Result<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(filename)),
            _ => Err(CasError::InvalidFilename(filename.to_string())),
        }
    }
}

/// Scan the files directly inside `dir` for `<ID><ext>` blobs.
///
/// A file qualifies when its name without the last extension is id-shaped.
/// Anything else is skipped and left alone.
pub fn scan_dir(dir: &Path) -> Result<Vec<(CanonicalId, String)>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            CasError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| io::Error::other("directory walk failed")),
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            warn!(path = %entry.path().display(), "skipping non UTF-8 filename");
            continue;
        };
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if let Some(id) = CanonicalId::parse(stem) {
            found.push((id, name.to_string()));
        }
    }
    Ok(found)
}

/// Lower-case the hint and make sure it starts with a dot.
///
/// An empty hint falls back to `default`.
pub fn normalize_extension(hint: &str, default: &str) -> String {
    let hint = hint.trim();
    let hint = if hint.is_empty() || hint == "." {
        default
    } else {
        hint
    };
    let lower = hint.to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}
