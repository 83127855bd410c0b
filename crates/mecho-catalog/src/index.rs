//! Canonical id to stored filename.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use mecho_cas::CanonicalId;
use mecho_config::{log_catalog_error, log_catalog_info};

use crate::error::Result;
use crate::persist;

type Entries = BTreeMap<CanonicalId, String>;

/// In-memory index backed by `index.json`.
///
/// Every mutation holds the lock across update and save, so concurrent writers
/// cannot interleave their load-modify-save steps.
#[derive(Debug)]
pub struct Index {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl Index {
    /// Load the index at `path`. Missing or corrupt files give an empty index.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries = Entries::new();
        for (key, filename) in persist::load_string_map(&path, "index") {
            match CanonicalId::parse(&key) {
                Some(id) => {
                    entries.insert(id, filename);
                }
                None => tracing::warn!(%key, "dropping index entry with malformed id"),
            }
        }
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full mapping to disk.
    pub fn save(&self) -> Result<()> {
        let entries = self.lock();
        persist::save_map(&self.path, &*entries)
    }

    pub fn get(&self, id: &CanonicalId) -> Option<String> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &CanonicalId) -> bool {
        self.lock().contains_key(id)
    }

    /// Insert or replace an entry and persist.
    pub fn put(&self, id: CanonicalId, filename: String) {
        let mut entries = self.lock();
        entries.insert(id, filename);
        self.persist(&entries);
    }

    /// Remove an entry and persist. Returns the filename it mapped to.
    pub fn remove(&self, id: &CanonicalId) -> Option<String> {
        let mut entries = self.lock();
        let removed = entries.remove(id);
        if removed.is_some() {
            self.persist(&entries);
        }
        removed
    }

    /// All ids, sorted.
    pub fn keys(&self) -> Vec<CanonicalId> {
        self.lock().keys().cloned().collect()
    }

    pub fn key_set(&self) -> HashSet<CanonicalId> {
        self.lock().keys().cloned().collect()
    }

    /// Sorted `(id, filename)` pairs.
    pub fn entries(&self) -> Vec<(CanonicalId, String)> {
        self.lock()
            .iter()
            .map(|(id, name)| (id.clone(), name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Replace the index with whatever id-named files sit directly in `dir`.
    ///
    /// Returns the new entry count. The previous in-memory state is kept if the
    /// directory cannot be read.
    pub fn rebuild_from_directory(&self, dir: &Path) -> Result<usize> {
        let scanned: Entries = mecho_cas::scan_dir(dir)?.into_iter().collect();
        let count = scanned.len();

        let mut entries = self.lock();
        *entries = scanned;
        self.persist(&entries);

        log_catalog_info!(
            "Index rebuilt from blob directory",
            entries = count,
            dir = dir.display().to_string(),
        );
        Ok(count)
    }

    /// Save while the caller holds the lock. Failures are logged and the
    /// in-memory state stays authoritative.
    fn persist(&self, entries: &Entries) {
        if let Err(e) = persist::save_map(&self.path, entries) {
            log_catalog_error!(
                "Failed to save index",
                path = self.path().display().to_string(),
                error = e.to_string(),
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
