//! Dataset builder: ties a schema mode to its metadata and splits.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use super::adapter::{self, RecordStream};
use super::fetcher::{Fetcher, Split};
use super::info::{DatasetInfo, ARCHIVE_URL};
use super::schema::SchemaMode;
use crate::config::Config;

/// A named configuration of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    pub name: SchemaMode,
    pub description: &'static str,
}

pub const BUILDER_CONFIGS: [BuilderConfig; 2] = [
    BuilderConfig {
        name: SchemaMode::Data,
        description:
            "The dialogues between the customer and agent and the expected action or outcome",
    },
    BuilderConfig {
        name: SchemaMode::Kb,
        description: "The knowledge base for the dialogues and conversations",
    },
];

pub const DEFAULT_CONFIG_NAME: SchemaMode = SchemaMode::Data;

impl BuilderConfig {
    pub fn for_mode(mode: SchemaMode) -> Self {
        match mode {
            SchemaMode::Data => BUILDER_CONFIGS[0],
            SchemaMode::Kb => BUILDER_CONFIGS[1],
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self::for_mode(DEFAULT_CONFIG_NAME)
    }
}

/// One split resolved to the file that holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitGenerator {
    pub split: Split,
    pub filepath: PathBuf,
}

impl SplitGenerator {
    /// Tag used in the split's file name (`train` or `dev`)
    pub fn tag(&self) -> &'static str {
        self.split.file_tag()
    }
}

#[derive(Debug, Clone)]
pub struct AirDialogue {
    config: BuilderConfig,
    url: String,
}

impl Default for AirDialogue {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_NAME)
    }
}

impl AirDialogue {
    pub fn new(mode: SchemaMode) -> Self {
        Self {
            config: BuilderConfig::for_mode(mode),
            url: ARCHIVE_URL.to_string(),
        }
    }

    /// Builder for the configured mode, resolving the configured archive URL
    pub fn from_config(config: &Config) -> Self {
        Self {
            config: BuilderConfig::for_mode(config.dataset.mode),
            url: config.dataset.url.clone(),
        }
    }

    /// Archive location handed to the fetcher
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn mode(&self) -> SchemaMode {
        self.config.name
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo::for_mode(self.config.name)
    }

    /// Resolve the archive and return one generator per split
    pub fn split_generators<F: Fetcher>(&self, fetcher: &F) -> Result<Vec<SplitGenerator>> {
        let archive = fetcher
            .resolve(&self.url)
            .with_context(|| format!("Failed to resolve {}", self.url))?;
        let mode = self.mode();

        Ok(Split::ALL
            .iter()
            .map(|&split| SplitGenerator {
                split,
                filepath: archive.split_path(split, mode),
            })
            .collect())
    }

    /// Stream the records of one split
    pub fn generate_examples(
        &self,
        generator: &SplitGenerator,
    ) -> crate::error::Result<RecordStream<BufReader<File>>> {
        info!(
            target: "builder",
            "Generating {} examples ({}) from {:?}",
            generator.split,
            self.mode(),
            generator.filepath
        );
        adapter::open(&generator.filepath, self.mode())
    }

    /// Resolve and open a single split
    pub fn load_split<F: Fetcher>(
        &self,
        fetcher: &F,
        split: Split,
    ) -> Result<RecordStream<BufReader<File>>> {
        let generator = self
            .split_generators(fetcher)?
            .into_iter()
            .find(|g| g.split == split)
            .with_context(|| format!("No generator for split {}", split))?;
        let stream = self
            .generate_examples(&generator)
            .with_context(|| format!("Failed to open {} split", split))?;
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fetcher::ResolvedArchive;
    use std::cell::RefCell;

    struct FixedFetcher(PathBuf);

    impl Fetcher for FixedFetcher {
        fn resolve(&self, _url: &str) -> Result<ResolvedArchive> {
            Ok(ResolvedArchive::new(&self.0))
        }
    }

    #[test]
    fn test_default_config_is_data() {
        let builder = AirDialogue::default();
        assert_eq!(builder.mode(), SchemaMode::Data);
        assert!(builder.config().description.contains("dialogues"));
    }

    #[test]
    fn test_split_generators_follow_mode() -> Result<()> {
        let fetcher = FixedFetcher(PathBuf::from("/extracted"));
        let generators = AirDialogue::new(SchemaMode::Kb).split_generators(&fetcher)?;

        assert_eq!(generators.len(), 2);
        assert_eq!(generators[0].split, Split::Train);
        assert_eq!(generators[0].tag(), "train");
        assert!(generators[0].filepath.ends_with("airdialogue/train_kb.json"));
        assert_eq!(generators[1].split, Split::Validation);
        assert_eq!(generators[1].tag(), "dev");
        assert!(generators[1].filepath.ends_with("airdialogue/dev_kb.json"));
        Ok(())
    }

    struct RecordingFetcher {
        root: PathBuf,
        urls: RefCell<Vec<String>>,
    }

    impl Fetcher for RecordingFetcher {
        fn resolve(&self, url: &str) -> Result<ResolvedArchive> {
            self.urls.borrow_mut().push(url.to_string());
            Ok(ResolvedArchive::new(&self.root))
        }
    }

    #[test]
    fn test_configured_url_reaches_fetcher() -> Result<()> {
        let mut config = Config::default();
        config.dataset.mode = SchemaMode::Kb;
        config.dataset.url = "file:///mirror/airdialogue.tar.gz".to_string();

        let builder = AirDialogue::from_config(&config);
        assert_eq!(builder.mode(), SchemaMode::Kb);

        let fetcher = RecordingFetcher {
            root: PathBuf::from("/mirror"),
            urls: RefCell::new(Vec::new()),
        };
        builder.split_generators(&fetcher)?;
        assert_eq!(
            fetcher.urls.borrow().as_slice(),
            ["file:///mirror/airdialogue.tar.gz"]
        );

        assert_eq!(AirDialogue::default().url(), ARCHIVE_URL);
        Ok(())
    }

    #[test]
    fn test_builder_configs() {
        assert_eq!(BUILDER_CONFIGS.len(), 2);
        assert_eq!(BuilderConfig::for_mode(SchemaMode::Kb).name, SchemaMode::Kb);
        assert_eq!(BuilderConfig::default().name, DEFAULT_CONFIG_NAME);
    }

    #[test]
    fn test_load_split_missing_file_errors() {
        let fetcher = FixedFetcher(PathBuf::from("/nonexistent/root"));
        let result = AirDialogue::new(SchemaMode::Data).load_split(&fetcher, Split::Train);
        assert!(result.is_err());
    }
}
