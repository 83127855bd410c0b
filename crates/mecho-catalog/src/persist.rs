//! Durable JSON object files.
//!
//! Both tables are stored as a single pretty-printed JSON object of string to
//! string. Writes use the write-rename pattern so a crash never leaves a
//! half-written table behind.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CatalogError, Result};

/// Read `path` as a JSON object of string values.
///
/// A missing file is an empty table. Unreadable or malformed content is logged
/// and also treated as empty: a corrupt table must never block startup.
/// Non-string values are skipped.
pub(crate) fn load_string_map(path: &Path, table: &'static str) -> Vec<(String, String)> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            mecho_config::log_catalog_warn!(
                "Failed to read table, starting empty",
                table = table,
                path = path.display().to_string(),
                error = e.to_string(),
            );
            return Vec::new();
        }
    };

    let object: Map<String, Value> = match serde_json::from_str(&text) {
        Ok(object) => object,
        Err(e) => {
            mecho_config::log_catalog_warn!(
                "Corrupt table, starting empty",
                table = table,
                path = path.display().to_string(),
                error = e.to_string(),
            );
            return Vec::new();
        }
    };

    object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            other => {
                tracing::warn!(table, %key, value = %other, "skipping non-string entry");
                None
            }
        })
        .collect()
}

/// Save `map` to `path` using the atomic write-rename pattern.
pub(crate) fn save_map<T: Serialize>(path: &Path, map: &T) -> Result<()> {
    write_atomic(path, map).map_err(|source| CatalogError::Persist {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic<T: Serialize>(path: &Path, map: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");

    let file = File::create(&tmp_path)?;
    let mut writer = BufWriter::new(&file);
    serde_json::to_writer_pretty(&mut writer, map)?;
    writer.flush()?;
    drop(writer);

    // Ensure data is on disk
    file.sync_all()?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(load_string_map(&temp.path().join("nope.json"), "index").is_empty());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_string_map(&path, "index").is_empty());

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(load_string_map(&path, "index").is_empty());
    }

    #[test]
    fn test_non_string_values_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("alias.json");
        fs::write(&path, r#"{"a": "X", "b": 7, "c": null}"#).unwrap();

        assert_eq!(
            load_string_map(&path, "alias"),
            vec![("a".to_string(), "X".to_string())]
        );
    }

    #[test]
    fn test_save_is_pretty_and_leaves_no_temp() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("alias.json");

        let mut map = BTreeMap::new();
        map.insert("猫".to_string(), "ID".to_string());
        save_map(&path, &map).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"猫\": \"ID\"\n}");
        assert!(!path.with_extension("json.tmp").exists());
    }
}
