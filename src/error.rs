use std::path::PathBuf;

use thiserror::Error;

/// Result type for record loading
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors raised while turning a split file into records.
///
/// Every variant is fatal for the split being read: the stream stops after
/// yielding one of these.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {} at line {line}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Schema violation in {} at line {line}, field `{field}`: {reason}", .path.display())]
    Schema {
        path: PathBuf,
        line: usize,
        field: String,
        reason: String,
    },
}

impl LoadError {
    /// Create a schema error for a field that is required but absent
    pub fn missing<P: Into<PathBuf>, F: Into<String>>(path: P, line: usize, field: F) -> Self {
        LoadError::Schema {
            path: path.into(),
            line,
            field: field.into(),
            reason: "missing required field".to_string(),
        }
    }

    /// Create a schema error with a custom reason
    pub fn schema<P, F, R>(path: P, line: usize, field: F, reason: R) -> Self
    where
        P: Into<PathBuf>,
        F: Into<String>,
        R: Into<String>,
    {
        LoadError::Schema {
            path: path.into(),
            line,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Line index the error refers to, if it is tied to one
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::Io { .. } => None,
            LoadError::Decode { line, .. } | LoadError::Schema { line, .. } => Some(*line),
        }
    }

    /// Name of the offending field for schema violations
    pub fn field(&self) -> Option<&str> {
        match self {
            LoadError::Schema { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, LoadError::Decode { .. })
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, LoadError::Schema { .. })
    }
}
