//! # mecho-config
//!
//! Configuration management for mecho.
//!
//! Loads configuration from:
//! 1. `~/.mecho/config.toml` (global)
//! 2. `.mecho/config.toml` (project-local, overrides global)
//! 3. Environment variables (highest priority)

pub mod logging;
pub mod path;
pub mod testing;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default data directory, before `~` expansion.
pub const DEFAULT_DATA_DIR: &str = "~/.mecho";

/// Durable alias table inside the data directory.
pub const ALIAS_FILE: &str = "alias.json";

/// Durable index inside the data directory.
pub const INDEX_FILE: &str = "index.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub capture: CaptureConfig,
    pub fetch: FetchConfig,
    pub display: DisplayConfig,
    pub bot: BotConfig,
}

impl Config {
    /// Load config from standard locations
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // 1. Load global config (~/.mecho/config.toml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                debug!("Loading global config from {:?}", global_path);
                config = Self::from_file(&global_path)?;
            }
        }

        // 2. Load project config (.mecho/config.toml) - overrides global
        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from {:?}", project_path);
            config.merge(Self::from_file(&project_path)?);
        }

        // 3. Apply environment variable overrides
        config.apply_env_overrides();

        Ok(config)
    }

    /// Load a single config file, without layering.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Global config path: ~/.mecho/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".mecho/config.toml"))
    }

    /// Project config path, relative to the working directory.
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".mecho/config.toml")
    }

    /// Merge another config (project overrides).
    ///
    /// A field in `other` only wins when it differs from the built-in default,
    /// so a project file naming one key does not reset the rest of the global file.
    pub fn merge(&mut self, other: Config) {
        let defaults = Config::default();

        if other.storage.data_dir != defaults.storage.data_dir {
            self.storage.data_dir = other.storage.data_dir;
        }
        if other.storage.blob_dir != defaults.storage.blob_dir {
            self.storage.blob_dir = other.storage.blob_dir;
        }
        if other.storage.default_extension != defaults.storage.default_extension {
            self.storage.default_extension = other.storage.default_extension;
        }
        if other.capture.await_ttl_secs != defaults.capture.await_ttl_secs {
            self.capture.await_ttl_secs = other.capture.await_ttl_secs;
        }
        if other.fetch.timeout_secs != defaults.fetch.timeout_secs {
            self.fetch.timeout_secs = other.fetch.timeout_secs;
        }
        if other.display.list_limit != defaults.display.list_limit {
            self.display.list_limit = other.display.list_limit;
        }
        if other.bot.command != defaults.bot.command {
            self.bot.command = other.bot.command;
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("MECHO_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(path);
        }
        if let Ok(ttl) = std::env::var("MECHO_AWAIT_TTL") {
            if let Ok(n) = ttl.parse() {
                self.capture.await_ttl_secs = n;
            }
        }
        if let Ok(timeout) = std::env::var("MECHO_FETCH_TIMEOUT") {
            if let Ok(n) = timeout.parse() {
                self.fetch.timeout_secs = n;
            }
        }
    }

    /// Resolve the on-disk layout, expanding `~` in the data directory.
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(
            path::expand_home(&self.storage.data_dir),
            &self.storage.blob_dir,
        )
    }

    /// Generate default config TOML string
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `index.json`, `alias.json` and the blob directory
    pub data_dir: PathBuf,
    /// Blob directory name, relative to `data_dir`
    pub blob_dir: String,
    /// Extension for blobs whose source carries no usable hint
    pub default_extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            blob_dir: "memes".to_string(),
            default_extension: ".png".to_string(),
        }
    }
}

/// Await-window ("send me the image next") configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// How long a bare `add` keeps waiting for the user's next image
    pub await_ttl_secs: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { await_ttl_secs: 60 }
    }
}

impl CaptureConfig {
    pub fn await_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.await_ttl_secs))
    }
}

/// Remote image fetch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total request timeout
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Reply formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Maximum lines shown by `list`
    pub list_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { list_limit: 10 }
    }
}

/// Chat command surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Command word, matched as `/<command>`
    pub command: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command: "meme".to_string(),
        }
    }
}

/// Resolved file locations of one catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub data_dir: PathBuf,
    pub blob_dir: PathBuf,
    pub index_file: PathBuf,
    pub alias_file: PathBuf,
}

impl DataLayout {
    pub fn new(data_dir: impl Into<PathBuf>, blob_dir: &str) -> Self {
        let data_dir = data_dir.into();
        Self {
            blob_dir: data_dir.join(blob_dir),
            index_file: data_dir.join(INDEX_FILE),
            alias_file: data_dir.join(ALIAS_FILE),
            data_dir,
        }
    }
}
