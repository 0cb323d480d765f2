//! Rebuild coordinator: one render-and-write pass.
//!
//! Shared entrypoint for one-shot builds and for every pass of a watch
//! session.

use std::time::{Duration, Instant};

use serde_json::Value;

use temple_core::{data, WatchSet};
use temple_renderer::Render;

use crate::error::{BuildError, PassError};
use crate::sink::Sink;

/// What a successful pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the rendered output.
    pub digest: String,
    pub duration: Duration,
}

/// Result of one rebuild pass.
#[derive(Debug)]
pub enum RebuildOutcome {
    /// Rendered output was written in full.
    Built(BuildSummary),
    /// The pass failed; the output may hold partial content.
    Failed(PassError),
}

impl RebuildOutcome {
    /// Turn a failed pass into an error, for callers that stop on failure.
    pub fn into_result(self) -> Result<BuildSummary, PassError> {
        match self {
            RebuildOutcome::Built(summary) => Ok(summary),
            RebuildOutcome::Failed(err) => Err(err),
        }
    }
}

/// Render `set`'s templates with `data` into `set`'s output.
///
/// The output is opened before rendering and closed afterwards on every path,
/// including renderer failure. Only a broken destination (open or close
/// failure on a named file) is returned as `Err`; anything the renderer
/// reports comes back as [`RebuildOutcome::Failed`].
pub fn rebuild(
    set: &WatchSet,
    renderer: &dyn Render,
    data: &Value,
) -> Result<RebuildOutcome, BuildError> {
    let started = Instant::now();
    let mut sink = Sink::open(set.output())?;

    let rendered = renderer.render(set.templates(), data, &mut sink);
    let summary = sink.close()?;

    match rendered {
        Ok(()) => {
            tracing::debug!(
                output = %set.output(),
                bytes = summary.bytes,
                digest = %summary.digest,
                "rendered",
            );
            Ok(RebuildOutcome::Built(BuildSummary {
                bytes: summary.bytes,
                digest: summary.digest,
                duration: started.elapsed(),
            }))
        }
        Err(err) => Ok(RebuildOutcome::Failed(PassError::Render(err))),
    }
}

/// Load the data file and run a single pass. Any failure is an error.
pub fn render_once(set: &WatchSet, renderer: &dyn Render) -> Result<BuildSummary, BuildError> {
    let data = data::load(set.data()).map_err(PassError::from)?;
    let summary = rebuild(set, renderer, &data)?.into_result()?;
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
