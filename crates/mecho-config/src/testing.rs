//! Test environment abstraction for isolated testing.
//!
//! Provides `TestEnvironment` to manage:
//! - A temporary data directory laid out like a real one
//! - A scratch "inbox" for source images outside the data directory
//! - Raw access to the durable JSON files for corruption tests
//!
//! # Usage
//!
//! ```ignore
//! use mecho_config::testing::TestEnvironment;
//!
//! #[test]
//! fn test_something() {
//!     let env = TestEnvironment::new().unwrap();
//!     let catalog = Catalog::open(&env.layout).unwrap();
//! }
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::TempDir;

use crate::{Config, DataLayout};

/// Atomic counter for unique test IDs
static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Isolated test environment with unique paths
pub struct TestEnvironment {
    /// Temporary directory (dropped on cleanup)
    _temp_dir: TempDir,
    /// Catalog file locations
    pub layout: DataLayout,
    /// Where test source images are created
    pub inbox: PathBuf,
    /// Unique test ID
    pub test_id: u32,
}

impl TestEnvironment {
    /// Create a new isolated test environment
    pub fn new() -> anyhow::Result<Self> {
        let test_id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        let layout = DataLayout::new(root.join("data"), "memes");
        let inbox = root.join("inbox");

        std::fs::create_dir_all(&layout.data_dir)?;
        std::fs::create_dir_all(&inbox)?;

        Ok(Self {
            _temp_dir: temp_dir,
            layout,
            inbox,
            test_id,
        })
    }

    /// Config pointing at this environment's data directory
    pub fn config(&self) -> Config {
        let mut cfg = Config::default();
        cfg.storage.data_dir = self.layout.data_dir.clone();
        cfg
    }

    /// Create a source file in the inbox
    pub fn create_file(&self, relative_path: &str, content: &[u8]) -> anyhow::Result<PathBuf> {
        let path = self.inbox.join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Drop a file straight into the blob directory, bypassing the store
    pub fn plant_blob(&self, filename: &str, content: &[u8]) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.layout.blob_dir)?;
        let path = self.layout.blob_dir.join(filename);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Overwrite `index.json` with arbitrary text
    pub fn write_index_raw(&self, text: &str) -> anyhow::Result<()> {
        std::fs::write(&self.layout.index_file, text)?;
        Ok(())
    }

    /// Overwrite `alias.json` with arbitrary text
    pub fn write_alias_raw(&self, text: &str) -> anyhow::Result<()> {
        std::fs::write(&self.layout.alias_file, text)?;
        Ok(())
    }

    /// Current `index.json` text, empty if absent
    pub fn read_index_raw(&self) -> String {
        std::fs::read_to_string(&self.layout.index_file).unwrap_or_default()
    }

    /// Current `alias.json` text, empty if absent
    pub fn read_alias_raw(&self) -> String {
        std::fs::read_to_string(&self.layout.alias_file).unwrap_or_default()
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_creates_directories() {
        let env = TestEnvironment::new().unwrap();
        assert!(env.layout.data_dir.exists());
        assert!(env.inbox.exists());
    }

    #[test]
    fn test_environment_is_unique() {
        let env1 = TestEnvironment::new().unwrap();
        let env2 = TestEnvironment::new().unwrap();
        assert_ne!(env1.layout.data_dir, env2.layout.data_dir);
        assert_ne!(env1.test_id, env2.test_id);
    }

    #[test]
    fn test_create_file() {
        let env = TestEnvironment::new().unwrap();
        let path = env.create_file("cat.gif", b"GIF89a").unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"GIF89a");
    }

    #[test]
    fn test_config_points_at_environment() {
        let env = TestEnvironment::new().unwrap();
        assert_eq!(env.config().layout(), env.layout);
    }
}
