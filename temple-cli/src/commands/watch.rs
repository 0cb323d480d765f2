//! Watch mode: render, then re-render on every write until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};

use temple_core::WatchSet;
use temple_renderer::RenderMode;

pub fn run(set: WatchSet, mode: RenderMode) -> Result<()> {
    let entry = set.entry().to_path_buf();
    let stats = temple_watch::start_blocking(set, Arc::from(mode.renderer()))
        .with_context(|| format!("watch session for {} failed", entry.display()))?;

    tracing::info!(
        rebuilds = stats.rebuilds,
        failed = stats.failed,
        reloads = stats.reloads,
        "stopped watching",
    );
    Ok(())
}
