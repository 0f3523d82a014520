//! CLI configuration: loading, saving and defaults

use std::path::{Path, PathBuf};
use std::sync::Arc;

use draft_core::EngineConfig;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current configuration format version
pub const CONFIG_VERSION: u32 = 1;

/// Log filter used when neither RUST_LOG nor the config file sets one
pub const DEFAULT_LOG_FILTER: &str = "draft_core=info,draft_cli=info";

/// Shared configuration manager type
pub type SharedConfig = Arc<RwLock<ConfigManager>>;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Complete CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    /// tracing-subscriber filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Engine settings handed to every document
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_filter: default_log_filter(),
            engine: EngineConfig::default(),
        }
    }
}

/// How the current configuration was obtained
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File,
    Missing,
    Malformed(String),
}

/// Loads, holds and saves the CLI configuration
pub struct ConfigManager {
    config: CliConfig,
    config_path: PathBuf,
    source: ConfigSource,
    dirty: bool,
}

impl ConfigManager {
    /// Load from `path`, or from the OS configuration directory when `None`.
    /// A missing or malformed file yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        let (config, source) = Self::load_from_path(&config_path);

        Self {
            config,
            config_path,
            source,
            dirty: false,
        }
    }

    /// Get the OS-standard configuration file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("draft")
            .join("config.ron")
    }

    fn load_from_path(path: &Path) -> (CliConfig, ConfigSource) {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return (CliConfig::default(), ConfigSource::Missing),
        };
        match ron::from_str(&content) {
            Ok(config) => (config, ConfigSource::File),
            Err(e) => (CliConfig::default(), ConfigSource::Malformed(e.to_string())),
        }
    }

    /// Log where the configuration came from. Called once logging is up.
    pub fn log_source(&self) {
        match &self.source {
            ConfigSource::File => tracing::info!("Loaded config from {:?}", self.config_path),
            ConfigSource::Missing => {
                tracing::info!("No config file at {:?}, using defaults", self.config_path)
            }
            ConfigSource::Malformed(e) => tracing::warn!(
                "Failed to parse config file {:?}: {}; using defaults",
                self.config_path,
                e
            ),
        }
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Get a reference to the current configuration
    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration (marks as dirty)
    pub fn config_mut(&mut self) -> &mut CliConfig {
        self.dirty = true;
        &mut self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the configuration to disk, creating the directory if needed
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            ron::ser::to_string_pretty(&self.config, ron::ser::PrettyConfig::default())?;
        std::fs::write(&self.config_path, content)?;

        tracing::info!("Saved config to {:?}", self.config_path);
        self.dirty = false;
        Ok(())
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }
}

/// Create a shared configuration manager
pub fn create_shared_config(path: Option<&Path>) -> SharedConfig {
    Arc::new(RwLock::new(ConfigManager::load(path)))
}
