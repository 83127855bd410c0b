//! The catalog ties the blob store, the index and the alias table together.
//!
//! Writes always go store first, then index, then aliases, so a crash between
//! steps leaves at worst an unindexed blob (recovered by `reload`) or a dangling
//! alias (gated at read time, pruned on the next delete or reload).

use std::path::PathBuf;

use mecho_cas::{is_id_shaped, CanonicalId, ContentStore};
use mecho_config::{log_catalog_debug, log_catalog_info, log_catalog_warn, DataLayout};
use tracing::instrument;

use crate::alias::AliasTable;
use crate::error::{CatalogError, Result};
use crate::index::Index;

/// What `show` reports about one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    pub id: CanonicalId,
    pub filename: String,
    pub alias: Option<String>,
    /// Whether the backing file is currently present.
    pub on_disk: bool,
}

/// One line of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: CanonicalId,
    pub alias: Option<String>,
}

impl ListEntry {
    /// The alias when there is one, otherwise the id.
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Result of a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadReport {
    pub entries: usize,
    pub pruned_aliases: usize,
}

#[derive(Debug)]
pub struct Catalog {
    store: ContentStore,
    index: Index,
    aliases: AliasTable,
}

impl Catalog {
    /// Open the catalog described by `layout`.
    ///
    /// Loads the index; if that yields nothing, rebuilds it from the blob
    /// directory. Aliases are loaded only once the index has settled. Corrupt
    /// tables never make this fail; only an unusable blob directory does.
    pub fn open(layout: &DataLayout) -> Result<Self> {
        Self::open_with_store(layout, ContentStore::new(&layout.blob_dir)?)
    }

    /// Like [`Catalog::open`] with a preconfigured store.
    pub fn open_with_store(layout: &DataLayout, store: ContentStore) -> Result<Self> {
        let index = Index::load(&layout.index_file);
        if index.is_empty() {
            if let Err(e) = index.rebuild_from_directory(store.root()) {
                log_catalog_warn!(
                    "Startup rebuild failed, continuing with empty index",
                    error = e.to_string(),
                );
            }
        }
        let aliases = AliasTable::load(&layout.alias_file);

        log_catalog_info!(
            "Catalog opened",
            entries = index.len(),
            aliases = aliases.len(),
            blob_dir = store.root().display().to_string(),
        );

        Ok(Self {
            store,
            index,
            aliases,
        })
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Store `data` and index it. Returns its id.
    ///
    /// A failed write leaves the index untouched.
    #[instrument(skip(self, data), fields(len = data.len()), level = "debug")]
    pub fn add_from_bytes(&self, data: &[u8], extension_hint: &str) -> Result<CanonicalId> {
        let id = ContentStore::compute_id(data);
        if let Some(existing) = self.index.get(&id) {
            if self.store.exists(&existing) {
                log_catalog_debug!(
                    "Blob already indexed",
                    id = id.as_str(),
                    filename = existing.as_str(),
                );
                return Ok(id);
            }
        }
        let filename = self.store.write(&id, extension_hint, data)?;
        self.index.put(id.clone(), filename);
        log_catalog_info!("Blob added", id = id.as_str());
        Ok(id)
    }

    /// Resolve an id or alias to an id that is currently indexed.
    pub fn resolve(&self, text: &str) -> Option<CanonicalId> {
        self.aliases
            .resolve(text)
            .filter(|id| self.index.contains(id))
    }

    pub fn describe(&self, text: &str) -> Option<Description> {
        let id = self.resolve(text)?;
        let filename = self.index.get(&id)?;
        Some(Description {
            alias: self.aliases.reverse_lookup(&id),
            on_disk: self.store.exists(&filename),
            id,
            filename,
        })
    }

    /// Every indexed id in order, each with at most one alias.
    pub fn list(&self) -> Vec<ListEntry> {
        self.index
            .keys()
            .into_iter()
            .map(|id| ListEntry {
                alias: self.aliases.reverse_lookup(&id),
                id,
            })
            .collect()
    }

    /// Delete whatever `text` resolves to. Returns false if nothing matched.
    pub fn delete(&self, text: &str) -> bool {
        match self.resolve(text) {
            Some(id) => self.delete_id(&id),
            None => false,
        }
    }

    /// Remove `id` from the catalog, cascading to its aliases.
    ///
    /// Every file stored for the id is removed. A file that cannot be removed is
    /// logged; the logical delete still goes ahead.
    #[instrument(skip(self), level = "debug")]
    pub fn delete_id(&self, id: &CanonicalId) -> bool {
        let Some(filename) = self.index.get(id) else {
            return false;
        };

        // Copies under other extensions would bring the id back on reload
        let mut files = self.store.files_for(id).unwrap_or_else(|e| {
            log_catalog_warn!(
                "Failed to scan for blob copies",
                id = id.as_str(),
                error = e.to_string(),
            );
            Vec::new()
        });
        if !files.contains(&filename) {
            files.push(filename);
        }
        for file in &files {
            if let Err(e) = self.store.delete(file) {
                log_catalog_warn!(
                    "Failed to remove blob file",
                    id = id.as_str(),
                    filename = file.as_str(),
                    error = e.to_string(),
                );
            }
        }

        self.index.remove(id);
        let pruned = self.aliases.prune_dangling(&self.index.key_set());
        log_catalog_info!("Blob deleted", id = id.as_str(), pruned_aliases = pruned);
        true
    }

    /// Rebuild the index from the blob directory and drop aliases it orphans.
    pub fn reload(&self) -> Result<ReloadReport> {
        let entries = self.index.rebuild_from_directory(self.store.root())?;
        let pruned_aliases = self.aliases.prune_dangling(&self.index.key_set());
        Ok(ReloadReport {
            entries,
            pruned_aliases,
        })
    }

    /// Bind `alias` to an indexed id.
    pub fn bind_alias(&self, id: &CanonicalId, alias: &str) -> Result<()> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(CatalogError::InvalidAlias {
                alias: alias.to_string(),
                reason: "alias is empty",
            });
        }
        if is_id_shaped(alias) {
            return Err(CatalogError::InvalidAlias {
                alias: alias.to_string(),
                reason: "looks like an id and would never resolve",
            });
        }
        if !self.index.contains(id) {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        self.aliases.set(alias, id.clone());
        log_catalog_info!("Alias bound", alias = alias, id = id.as_str());
        Ok(())
    }

    /// Path of the blob for `id`, if indexed and present on disk.
    pub fn blob_path(&self, id: &CanonicalId) -> Option<PathBuf> {
        let filename = self.index.get(id)?;
        if !self.store.exists(&filename) {
            return None;
        }
        self.store.path(&filename).ok()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mecho_config::testing::TestEnvironment;
    use std::fs;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

    fn open(env: &TestEnvironment) -> Catalog {
        Catalog::open(&env.layout).unwrap()
    }

    #[test]
    fn test_add_png_scenario() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);

        let id = catalog.add_from_bytes(PNG, ".png").unwrap();
        assert_eq!(id, CanonicalId::from_bytes(PNG));

        let blob = env.layout.blob_dir.join(format!("{}.png", id));
        assert_eq!(fs::read(&blob).unwrap(), PNG);

        let index: serde_json::Value = serde_json::from_str(&env.read_index_raw()).unwrap();
        assert_eq!(
            index,
            serde_json::json!({ id.as_str(): format!("{}.png", id) })
        );
    }

    #[test]
    fn test_add_twice_is_idempotent() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);

        let first = catalog.add_from_bytes(PNG, ".png").unwrap();
        let second = catalog.add_from_bytes(PNG, ".png").unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog.len(), 1);
        assert_eq!(fs::read_dir(&env.layout.blob_dir).unwrap().count(), 1);
        assert_eq!(
            fs::read(env.layout.blob_dir.join(format!("{}.png", first))).unwrap(),
            PNG
        );
    }

    #[test]
    fn test_failed_write_leaves_index_untouched() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);

        // Swap the blob directory for a plain file so every write fails.
        fs::remove_dir(&env.layout.blob_dir).unwrap();
        fs::write(&env.layout.blob_dir, b"not a directory").unwrap();

        let err = catalog.add_from_bytes(PNG, ".png").unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));
        assert!(catalog.is_empty());
        assert!(env.read_index_raw().is_empty());
    }

    #[test]
    fn test_resolve_is_gated_by_index() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);

        let unknown = CanonicalId::from_bytes(b"never added");
        assert_eq!(catalog.resolve(unknown.as_str()), None);

        // A dangling alias written behind the catalog's back
        catalog.aliases().set("ghost", unknown);
        assert_eq!(catalog.resolve("ghost"), None);

        let id = catalog.add_from_bytes(PNG, "png").unwrap();
        assert_eq!(
            catalog.resolve(&id.as_str().to_ascii_lowercase()),
            Some(id)
        );
    }

    #[test]
    fn test_bind_alias_requires_indexed_id() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);
        let before = env.read_alias_raw();

        let missing = CanonicalId::from_bytes(b"missing");
        let err = catalog.bind_alias(&missing, "cat").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        assert_eq!(env.read_alias_raw(), before);
        assert_eq!(catalog.alias_count(), 0);
    }

    #[test]
    fn test_bind_alias_rejects_unusable_names() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);
        let id = catalog.add_from_bytes(PNG, ".png").unwrap();

        assert!(matches!(
            catalog.bind_alias(&id, "   "),
            Err(CatalogError::InvalidAlias { .. })
        ));
        assert!(matches!(
            catalog.bind_alias(&id, "0123456789abcdef0123456789ABCDEF"),
            Err(CatalogError::InvalidAlias { .. })
        ));
    }

    #[test]
    fn test_describe() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);
        let id = catalog.add_from_bytes(PNG, ".png").unwrap();
        catalog.bind_alias(&id, "cat").unwrap();

        let desc = catalog.describe("cat").unwrap();
        assert_eq!(desc.id, id);
        assert_eq!(desc.alias.as_deref(), Some("cat"));
        assert_eq!(desc.filename, format!("{}.png", id));
        assert!(desc.on_disk);

        fs::remove_file(env.layout.blob_dir.join(&desc.filename)).unwrap();
        assert!(!catalog.describe(id.as_str()).unwrap().on_disk);
        assert!(catalog.describe("dog").is_none());
    }

    #[test]
    fn test_list_one_label_per_id() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);
        let a = catalog.add_from_bytes(b"a", ".png").unwrap();
        let b = catalog.add_from_bytes(b"b", ".png").unwrap();
        catalog.bind_alias(&a, "zz").unwrap();
        catalog.bind_alias(&a, "aa").unwrap();

        let list = catalog.list();
        assert_eq!(list.len(), 2);

        let mut ids: Vec<_> = list.iter().map(|e| e.id.clone()).collect();
        let mut expected = vec![a.clone(), b.clone()];
        expected.sort();
        assert_eq!(ids, expected);
        ids.dedup();
        assert_eq!(ids.len(), 2);

        let a_entry = list.iter().find(|e| e.id == a).unwrap();
        assert_eq!(a_entry.label(), "aa");
        let b_entry = list.iter().find(|e| e.id == b).unwrap();
        assert_eq!(b_entry.label(), b.as_str());
    }

    #[test]
    fn test_delete_cascades_to_aliases() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);
        let doomed = catalog.add_from_bytes(b"doomed", ".gif").unwrap();
        let kept = catalog.add_from_bytes(b"kept", ".gif").unwrap();
        catalog.bind_alias(&doomed, "bye").unwrap();
        catalog.bind_alias(&doomed, "later").unwrap();
        catalog.bind_alias(&kept, "stay").unwrap();

        assert!(catalog.delete("bye"));

        assert_eq!(catalog.resolve(doomed.as_str()), None);
        assert_eq!(catalog.index().get(&doomed), None);
        assert!(catalog.aliases().aliases_for(&doomed).is_empty());
        assert_eq!(catalog.resolve("stay"), Some(kept));
        assert!(!env
            .layout
            .blob_dir
            .join(format!("{}.gif", doomed))
            .exists());

        assert!(!catalog.delete("bye"));
        assert!(!catalog.delete(doomed.as_str()));
    }

    #[test]
    fn test_delete_with_missing_file_still_succeeds() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);
        let id = catalog.add_from_bytes(PNG, ".png").unwrap();
        fs::remove_file(env.layout.blob_dir.join(format!("{}.png", id))).unwrap();

        assert!(catalog.delete_id(&id));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_readd_with_other_extension_keeps_one_blob() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);

        let id = catalog.add_from_bytes(PNG, ".png").unwrap();
        assert_eq!(catalog.add_from_bytes(PNG, ".gif").unwrap(), id);

        assert_eq!(fs::read_dir(&env.layout.blob_dir).unwrap().count(), 1);
        assert_eq!(catalog.index().get(&id), Some(format!("{}.png", id)));

        assert!(catalog.delete_id(&id));
        assert_eq!(catalog.reload().unwrap().entries, 0);
        assert_eq!(catalog.resolve(id.as_str()), None);
    }

    #[test]
    fn test_delete_removes_copies_under_other_extensions() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);
        let id = catalog.add_from_bytes(PNG, ".png").unwrap();
        env.plant_blob(&format!("{}.gif", id), PNG).unwrap();

        assert!(catalog.delete_id(&id));

        assert_eq!(fs::read_dir(&env.layout.blob_dir).unwrap().count(), 0);
        assert_eq!(catalog.reload().unwrap().entries, 0);
        assert_eq!(catalog.resolve(id.as_str()), None);
    }

    #[test]
    fn test_unremovable_blob_does_not_block_delete() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);
        let id = catalog.add_from_bytes(PNG, ".png").unwrap();
        catalog.bind_alias(&id, "stuck").unwrap();

        // A directory under the blob's name makes remove_file fail
        let blob = env.layout.blob_dir.join(format!("{}.png", id));
        fs::remove_file(&blob).unwrap();
        fs::create_dir(&blob).unwrap();

        assert!(catalog.delete_id(&id));
        assert_eq!(catalog.index().get(&id), None);
        assert_eq!(catalog.resolve("stuck"), None);
        assert_eq!(catalog.alias_count(), 0);
        assert!(!env.read_alias_raw().contains("stuck"));
        assert!(blob.is_dir());
    }

    #[test]
    fn test_reload_is_idempotent() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);
        let a = catalog.add_from_bytes(b"a", ".png").unwrap();
        let b = catalog.add_from_bytes(b"b", ".png").unwrap();
        catalog.bind_alias(&a, "first").unwrap();
        catalog.bind_alias(&b, "second").unwrap();

        // b's file vanishes behind the catalog's back
        fs::remove_file(env.layout.blob_dir.join(format!("{}.png", b))).unwrap();

        let report = catalog.reload().unwrap();
        assert_eq!(
            report,
            ReloadReport {
                entries: 1,
                pruned_aliases: 1
            }
        );

        let again = catalog.reload().unwrap();
        assert_eq!(
            again,
            ReloadReport {
                entries: 1,
                pruned_aliases: 0
            }
        );
        assert_eq!(catalog.resolve("first"), Some(a));
    }

    #[test]
    fn test_blob_path() {
        let env = TestEnvironment::new().unwrap();
        let catalog = open(&env);
        let id = catalog.add_from_bytes(PNG, ".png").unwrap();

        let path = catalog.blob_path(&id).unwrap();
        assert_eq!(fs::read(&path).unwrap(), PNG);

        fs::remove_file(&path).unwrap();
        assert_eq!(catalog.blob_path(&id), None);
        assert_eq!(catalog.blob_path(&CanonicalId::from_bytes(b"x")), None);
    }
}
