pub mod config;
pub mod dataset;
pub mod error;
pub mod utils;

pub use dataset::{open, AirDialogue, Record, RecordStream, SchemaMode, Split};
pub use error::LoadError;
