//! Error types for temple-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling a [`WatchSet`](crate::WatchSet).
#[derive(Debug, Error)]
pub enum CoreError {
    /// No template paths were supplied.
    #[error("at least one input file required")]
    NoTemplates,
}

/// All errors that can arise while loading the data file.
#[derive(Debug, Error)]
pub enum DataError {
    /// The data file could not be read (missing, permission denied, etc.).
    #[error("error reading data file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON decode error, with line and column from serde_json.
    #[error("failed to decode JSON data at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// YAML decode error for `.yaml` / `.yml` data files.
    #[error("failed to decode YAML data at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
