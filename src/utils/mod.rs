//! Utility functions and helpers
//!
//! Filesystem locations and logging setup shared by the loader.

pub mod app_paths;
pub mod logging;
