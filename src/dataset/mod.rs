//! AirDialogue dataset loading
//!
//! Split files are newline-delimited JSON. The adapter turns them into typed
//! records in one of two schema modes; the builder and fetcher locate the
//! files for each split and describe the dataset.

pub mod adapter;
pub mod builder;
pub mod class_label;
pub mod fetcher;
pub mod info;
pub mod schema;

mod fields;

pub use adapter::{open, RecordStream};
pub use builder::{AirDialogue, BuilderConfig, SplitGenerator, BUILDER_CONFIGS};
pub use class_label::ClassLabel;
pub use fetcher::{Fetcher, LocalFetcher, ResolvedArchive, Split};
pub use info::DatasetInfo;
pub use schema::{
    Action, ActionStatus, Connections, DialogueRecord, FlightClass, Goal, Intent, KbEntry,
    KbRecord, Record, SchemaMode, SearchEvent, Slot,
};
