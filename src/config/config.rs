use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::dataset::info::ARCHIVE_URL;
use crate::dataset::schema::SchemaMode;
use crate::utils::app_paths::AppPaths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Directory the archive was extracted into (defaults to the user cache dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_root: Option<PathBuf>,

    /// Schema mode used when none is given explicitly
    pub mode: SchemaMode,

    /// Archive location handed to the fetcher
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter, overridden by RUST_LOG
    pub filter: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_root: None,
            mode: SchemaMode::Data,
            url: ARCHIVE_URL.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl DatasetConfig {
    /// Configured data root, or the default location when unset
    pub fn resolved_data_root(&self) -> Result<PathBuf> {
        match &self.data_root {
            Some(root) => Ok(root.clone()),
            None => AppPaths::default_data_root(),
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            debug!(target: "config", "No config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        debug!(target: "config", "Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::get_config_path()?)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        format!(
            r#"# AirDialogue loader configuration
# Location: ~/.config/airdialogue/config.toml (Linux)

[dataset]
# Directory the archive was extracted into. The split files are expected at
# <data_root>/airdialogue_data/airdialogue/{{train|dev}}_{{data|kb}}.json
# Leave commented to use the user cache directory.
# data_root = "/path/to/extracted"

# Schema mode: "data" (dialogues) or "kb" (flight knowledge base)
mode = "data"

# Archive location passed to the fetcher
url = "{}"

[logging]
# Default tracing filter; RUST_LOG overrides it
filter = "info"
"#,
            ARCHIVE_URL
        )
    }
}
