//! One-shot mode: render once and exit.

use anyhow::{Context, Result};

use temple_core::WatchSet;
use temple_renderer::RenderMode;

pub fn run(set: &WatchSet, mode: RenderMode) -> Result<()> {
    let renderer = mode.renderer();
    let summary = temple_build::render_once(set, renderer.as_ref())
        .with_context(|| format!("failed to render {}", set.entry().display()))?;

    tracing::debug!(
        mode = %mode,
        output = %set.output(),
        bytes = summary.bytes,
        digest = %summary.digest,
        duration_ms = summary.duration.as_millis(),
        "done",
    );
    Ok(())
}
