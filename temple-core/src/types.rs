//! Domain types for a temple build.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! A [`WatchSet`] is built once per invocation and never mutated afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// OutputTarget
// ---------------------------------------------------------------------------

/// Where rendered output goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OutputTarget {
    /// The process's standard output. Never closed by a build pass.
    #[default]
    Stdout,
    /// A named file, created or truncated on every pass.
    File(PathBuf),
}

impl OutputTarget {
    /// Resolve a command-line value. The empty string means standard output.
    pub fn from_arg(arg: &str) -> Self {
        if arg.is_empty() {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(arg))
        }
    }

}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "<stdout>"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// WatchSet
// ---------------------------------------------------------------------------

/// Immutable description of one build: which templates, which data, where to.
///
/// The template list is ordered and never empty; the first entry is the base
/// template that gets executed, the rest are made available to it by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSet {
    templates: Vec<PathBuf>,
    data: Option<PathBuf>,
    output: OutputTarget,
}

impl WatchSet {
    /// Build a [`WatchSet`], rejecting an empty template list.
    ///
    /// An empty data path is normalised to `None`.
    pub fn new(
        templates: Vec<PathBuf>,
        data: Option<PathBuf>,
        output: OutputTarget,
    ) -> Result<Self, CoreError> {
        if templates.is_empty() {
            return Err(CoreError::NoTemplates);
        }
        let data = data.filter(|p| !p.as_os_str().is_empty());
        Ok(WatchSet {
            templates,
            data,
            output,
        })
    }

    pub fn templates(&self) -> &[PathBuf] {
        &self.templates
    }

    /// The base template (first in the list).
    pub fn entry(&self) -> &Path {
        &self.templates[0]
    }

    pub fn data(&self) -> Option<&Path> {
        self.data.as_deref()
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }

    /// Every path a watch session must subscribe to: templates first, then
    /// the data file if there is one.
    pub fn watched_paths(&self) -> impl Iterator<Item = &Path> {
        self.templates
            .iter()
            .map(PathBuf::as_path)
            .chain(self.data.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
