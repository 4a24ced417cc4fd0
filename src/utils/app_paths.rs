use anyhow::{anyhow, Result};
use std::path::PathBuf;

const APP_DIR: &str = "airdialogue";

pub struct AppPaths;

impl AppPaths {
    /// Directory holding `config.toml`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join(APP_DIR))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default place where the host extracts the dataset archive
    pub fn default_data_root() -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow!("Could not determine cache directory"))?;
        Ok(cache_dir.join(APP_DIR))
    }
}
