//! Error types for temple-build.

use std::path::PathBuf;

use thiserror::Error;

use temple_core::DataError;
use temple_renderer::RenderError;

/// Failure of a single build pass. A watch session logs these and carries on.
#[derive(Debug, Error)]
pub enum PassError {
    /// The data file could not be read or decoded.
    #[error(transparent)]
    Data(#[from] DataError),

    /// A template failed to load, parse, or execute.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// All errors that can arise from build operations.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The output file could not be created or truncated.
    #[error("error opening outfile {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Buffered output could not be flushed to the output file.
    #[error("error closing outfile {path}: {source}")]
    Close {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A recoverable pass failure, surfaced as an error in one-shot mode.
    #[error(transparent)]
    Pass(#[from] PassError),
}
