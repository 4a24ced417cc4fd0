//! Configuration module
//!
//! Loader settings read from `config.toml`.

pub mod config;

pub use config::{Config, DatasetConfig, LoggingConfig};
