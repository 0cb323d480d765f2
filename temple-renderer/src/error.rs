//! Error types for temple-renderer.

use std::error::Error as _;
use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from template rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template paths were given to the renderer.
    #[error("no templates to render")]
    NoTemplates,

    /// Filesystem error while reading a template file.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template failed to parse (syntax error, unknown parent, ...).
    #[error("template parse error: {}", chain(.0))]
    Parse(#[source] tera::Error),

    /// The entry template failed while executing against the data.
    #[error("template execution error in {template}: {}", chain(.source))]
    Execute {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// The data value could not be turned into a rendering context.
    #[error("invalid template data: {}", chain(.0))]
    Context(#[source] tera::Error),
}

/// Tera keeps the useful detail (line, column, missing variable) in the
/// source chain; flatten it into one line.
fn chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
