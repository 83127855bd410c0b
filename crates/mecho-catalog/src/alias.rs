//! Human-chosen names for canonical ids.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use mecho_cas::CanonicalId;
use mecho_config::{log_catalog_error, log_catalog_info};

use crate::error::Result;
use crate::persist;

type Aliases = BTreeMap<String, CanonicalId>;

/// Alias table backed by `alias.json`.
///
/// Aliases are kept sorted, so when several aliases point at the same id the
/// reverse lookup always reports the lexicographically smallest one.
#[derive(Debug)]
pub struct AliasTable {
    path: PathBuf,
    aliases: Mutex<Aliases>,
}

impl AliasTable {
    /// Load aliases from `path`. Missing or corrupt files give an empty table.
    ///
    /// Aliases are trimmed; empty aliases and non-id targets are dropped.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut aliases = Aliases::new();
        for (alias, target) in persist::load_string_map(&path, "alias") {
            let alias = alias.trim();
            if alias.is_empty() {
                continue;
            }
            match CanonicalId::parse(&target) {
                Some(id) => {
                    aliases.insert(alias.to_string(), id);
                }
                None => tracing::warn!(%alias, %target, "dropping alias with malformed target"),
            }
        }
        Self {
            path,
            aliases: Mutex::new(aliases),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full table to disk.
    pub fn save(&self) -> Result<()> {
        let aliases = self.lock();
        persist::save_map(&self.path, &*aliases)
    }

    /// Resolve user text to an id.
    ///
    /// Id-shaped text is taken literally and never looked up, so an alias can
    /// not shadow a real id.
    pub fn resolve(&self, text: &str) -> Option<CanonicalId> {
        if let Some(id) = CanonicalId::parse(text) {
            return Some(id);
        }
        self.lock().get(text.trim()).cloned()
    }

    /// Bind `alias` to `id`, replacing any previous target, and persist.
    pub fn set(&self, alias: &str, id: CanonicalId) {
        let mut aliases = self.lock();
        aliases.insert(alias.trim().to_string(), id);
        self.persist(&aliases);
    }

    /// One alias currently pointing at `id` (the smallest), if any.
    pub fn reverse_lookup(&self, id: &CanonicalId) -> Option<String> {
        self.lock()
            .iter()
            .find(|(_, target)| *target == id)
            .map(|(alias, _)| alias.clone())
    }

    /// Every alias pointing at `id`, sorted.
    pub fn aliases_for(&self, id: &CanonicalId) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(_, target)| *target == id)
            .map(|(alias, _)| alias.clone())
            .collect()
    }

    /// Sorted `(alias, id)` pairs.
    pub fn entries(&self) -> Vec<(String, CanonicalId)> {
        self.lock()
            .iter()
            .map(|(alias, id)| (alias.clone(), id.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove every alias whose target is not in `valid_ids`.
    ///
    /// Saves once, and only when something was removed.
    pub fn prune_dangling(&self, valid_ids: &HashSet<CanonicalId>) -> usize {
        let mut aliases = self.lock();
        let before = aliases.len();
        aliases.retain(|_, id| valid_ids.contains(id));
        let removed = before - aliases.len();
        if removed > 0 {
            self.persist(&aliases);
            log_catalog_info!("Pruned dangling aliases", removed = removed);
        }
        removed
    }

    fn persist(&self, aliases: &Aliases) {
        if let Err(e) = persist::save_map(&self.path, aliases) {
            log_catalog_error!(
                "Failed to save aliases",
                path = self.path().display().to_string(),
                error = e.to_string(),
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, Aliases> {
        self.aliases.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn table(temp: &TempDir) -> AliasTable {
        AliasTable::load(temp.path().join("alias.json"))
    }

    #[test]
    fn test_literal_id_wins_over_alias() {
        let temp = TempDir::new().unwrap();
        let aliases = table(&temp);

        let literal = "5d41402abc4b2a76b9719d911017c592";
        let other = CanonicalId::from_bytes(b"other");
        aliases.set(literal, other);

        assert_eq!(
            aliases.resolve(literal).unwrap().as_str(),
            "5D41402ABC4B2A76B9719D911017C592"
        );
    }

    #[test]
    fn test_resolve_alias_trims_input() {
        let temp = TempDir::new().unwrap();
        let aliases = table(&temp);
        let id = CanonicalId::from_bytes(b"cat");
        aliases.set("  cat ", id.clone());

        assert_eq!(aliases.resolve("cat"), Some(id.clone()));
        assert_eq!(aliases.resolve(" cat "), Some(id));
        assert_eq!(aliases.resolve("Cat"), None);
    }

    #[test]
    fn test_set_overwrites_and_persists() {
        let temp = TempDir::new().unwrap();
        let aliases = table(&temp);
        let first = CanonicalId::from_bytes(b"first");
        let second = CanonicalId::from_bytes(b"second");

        aliases.set("dog", first);
        aliases.set("dog", second.clone());

        let reloaded = table(&temp);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.resolve("dog"), Some(second));
    }

    #[test]
    fn test_reverse_lookup_picks_smallest_alias() {
        let temp = TempDir::new().unwrap();
        let aliases = table(&temp);
        let id = CanonicalId::from_bytes(b"shared");

        aliases.set("zebra", id.clone());
        aliases.set("apple", id.clone());
        aliases.set("mango", id.clone());

        assert_eq!(aliases.reverse_lookup(&id).as_deref(), Some("apple"));
        assert_eq!(aliases.aliases_for(&id), vec!["apple", "mango", "zebra"]);
        assert_eq!(
            aliases.reverse_lookup(&CanonicalId::from_bytes(b"nobody")),
            None
        );
    }

    #[test]
    fn test_prune_dangling() {
        let temp = TempDir::new().unwrap();
        let aliases = table(&temp);
        let keep = CanonicalId::from_bytes(b"keep");
        let gone = CanonicalId::from_bytes(b"gone");

        aliases.set("a", keep.clone());
        aliases.set("b", gone.clone());
        aliases.set("c", gone);

        let valid: HashSet<_> = [keep.clone()].into_iter().collect();
        assert_eq!(aliases.prune_dangling(&valid), 2);
        assert_eq!(aliases.prune_dangling(&valid), 0);

        let reloaded = table(&temp);
        assert_eq!(reloaded.entries(), vec![("a".to_string(), keep)]);
    }

    #[test]
    fn test_prune_without_changes_does_not_write() {
        let temp = TempDir::new().unwrap();
        let aliases = table(&temp);
        assert_eq!(aliases.prune_dangling(&HashSet::new()), 0);
        assert!(!temp.path().join("alias.json").exists());
    }

    #[test]
    fn test_load_trims_and_normalizes() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("alias.json"),
            r#"{" cat ": "5d41402abc4b2a76b9719d911017c592", "  ": "5D41402ABC4B2A76B9719D911017C592", "bad": "xyz"}"#,
        )
        .unwrap();

        let aliases = table(&temp);
        assert_eq!(aliases.len(), 1);
        assert_eq!(
            aliases.resolve("cat").unwrap().as_str(),
            "5D41402ABC4B2A76B9719D911017C592"
        );
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("alias.json"), "not json at all").unwrap();
        assert!(table(&temp).is_empty());
    }
}
