//! Resolution of the dataset archive into local split files.
//!
//! Downloading and unpacking the archive is the host's business. A `Fetcher`
//! only has to say where the extracted tree lives; split file names are then
//! derived from the split and the schema mode.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::schema::SchemaMode;

/// Directory, relative to the extracted archive root, holding the split files
pub const DATA_SUBDIR: [&str; 2] = ["airdialogue_data", "airdialogue"];

/// Named partitions of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Validation,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::Train, Split::Validation];

    pub fn name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
        }
    }

    /// Prefix used by the split's file name
    pub fn file_tag(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "dev",
        }
    }

    pub fn file_name(&self, mode: SchemaMode) -> String {
        format!("{}_{}.json", self.file_tag(), mode)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An archive that has been fetched and extracted somewhere on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArchive {
    extracted_root: PathBuf,
}

impl ResolvedArchive {
    pub fn new<P: Into<PathBuf>>(extracted_root: P) -> Self {
        Self {
            extracted_root: extracted_root.into(),
        }
    }

    pub fn extracted_root(&self) -> &Path {
        &self.extracted_root
    }

    pub fn data_dir(&self) -> PathBuf {
        DATA_SUBDIR
            .iter()
            .fold(self.extracted_root.clone(), |dir, part| dir.join(part))
    }

    pub fn split_path(&self, split: Split, mode: SchemaMode) -> PathBuf {
        self.data_dir().join(split.file_name(mode))
    }

    pub fn train_path(&self, mode: SchemaMode) -> PathBuf {
        self.split_path(Split::Train, mode)
    }

    pub fn validation_path(&self, mode: SchemaMode) -> PathBuf {
        self.split_path(Split::Validation, mode)
    }
}

/// Host-supplied collaborator that turns the archive URL into local files
pub trait Fetcher {
    fn resolve(&self, url: &str) -> Result<ResolvedArchive>;
}

/// Fetcher for an archive that has already been extracted to a known directory
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    extracted_root: PathBuf,
}

impl LocalFetcher {
    pub fn new<P: Into<PathBuf>>(extracted_root: P) -> Self {
        Self {
            extracted_root: extracted_root.into(),
        }
    }

    /// Use the data root from the loaded configuration
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Ok(Self::new(config.dataset.resolved_data_root()?))
    }
}

impl Fetcher for LocalFetcher {
    fn resolve(&self, url: &str) -> Result<ResolvedArchive> {
        let archive = ResolvedArchive::new(&self.extracted_root);
        let data_dir = archive.data_dir();
        if !data_dir.is_dir() {
            bail!(
                "Archive for {} has not been extracted: {:?} is not a directory",
                url,
                data_dir
            );
        }
        debug!(target: "fetcher", "Resolved {} to {:?}", url, data_dir);
        Ok(archive)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn resolve(&self, url: &str) -> Result<ResolvedArchive> {
        (**self).resolve(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_split_file_names() {
        assert_eq!(Split::Train.file_name(SchemaMode::Data), "train_data.json");
        assert_eq!(Split::Validation.file_name(SchemaMode::Kb), "dev_kb.json");
        assert_eq!(Split::Validation.to_string(), "validation");
    }

    #[test]
    fn test_resolved_paths() {
        let archive = ResolvedArchive::new("/cache/extracted");
        assert_eq!(
            archive.train_path(SchemaMode::Kb),
            PathBuf::from("/cache/extracted/airdialogue_data/airdialogue/train_kb.json")
        );
        assert_eq!(
            archive.validation_path(SchemaMode::Data),
            PathBuf::from("/cache/extracted/airdialogue_data/airdialogue/dev_data.json")
        );
    }

    #[test]
    fn test_local_fetcher_requires_extracted_tree() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let fetcher = LocalFetcher::new(dir.path());
        assert!(fetcher.resolve("https://example.invalid/a.tar.gz").is_err());

        fs::create_dir_all(dir.path().join("airdialogue_data").join("airdialogue"))?;
        let archive = fetcher.resolve("https://example.invalid/a.tar.gz")?;
        assert_eq!(archive.extracted_root(), dir.path());
        Ok(())
    }
}
