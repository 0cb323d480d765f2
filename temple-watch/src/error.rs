use std::path::PathBuf;

use thiserror::Error;

/// Error surface for watch sessions. Every variant ends the session.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("failed to watch {path}: {source}")]
    Register {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("error reading data file: {0}")]
    Data(#[from] temple_core::DataError),

    #[error(transparent)]
    Build(#[from] temple_build::BuildError),

    #[error("task error: {0}")]
    Task(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> WatchError {
    WatchError::Io {
        path: path.into(),
        source,
    }
}
