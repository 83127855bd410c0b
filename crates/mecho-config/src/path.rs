//! Path helpers shared by the CLI and the catalog.

use std::path::{Path, PathBuf};

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or when no home directory is known, are
/// returned unchanged.
pub fn expand_home(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Extension of the last path segment, including the leading dot.
///
/// Only short alphanumeric extensions count; anything else (query strings,
/// random suffixes) yields `None` so the caller can fall back to a default.
pub fn extension_hint(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 5 || !ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(format!(".{}", ext))
}

/// Final path segment without its extension.
pub fn file_stem(name: &str) -> Option<&str> {
    Path::new(name).file_stem()?.to_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/srv/data"), PathBuf::from("/srv/data"));
        assert_eq!(expand_home("relative/dir"), PathBuf::from("relative/dir"));
    }

    #[test]
    fn test_expand_home_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.mecho"), home.join(".mecho"));
            assert_eq!(expand_home("~"), home);
        }
    }

    #[test]
    fn test_extension_hint() {
        assert_eq!(extension_hint("cat.GIF").as_deref(), Some(".GIF"));
        assert_eq!(extension_hint("/tmp/a/b.jpeg").as_deref(), Some(".jpeg"));
        assert_eq!(extension_hint("noext"), None);
        assert_eq!(extension_hint("weird.x-y"), None);
        assert_eq!(extension_hint("long.extension"), None);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(
            file_stem("5D41402ABC4B2A76B9719D911017C592.image"),
            Some("5D41402ABC4B2A76B9719D911017C592")
        );
        assert_eq!(file_stem("/a/b/c.png"), Some("c"));
    }
}
