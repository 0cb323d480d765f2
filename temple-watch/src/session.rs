//! Watch session: keeps the output in step with the templates and data file.
//!
//! The session owns the current data value and is the only place that decides
//! whether a failure is logged or ends the session. Rebuilds run one at a time
//! in event delivery order; a burst of N writes yields N rebuilds.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tracing::{Instrument, Span};

use temple_build::RebuildOutcome;
use temple_core::{data, WatchSet};
use temple_renderer::Render;

use crate::error::{io_err, WatchError};
use crate::event::FsEvent;

/// Counters for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Rebuild passes run, including the initial one.
    pub rebuilds: usize,
    /// Passes whose render failed.
    pub failed: usize,
    /// Successful data file reloads.
    pub reloads: usize,
    /// Data reloads that failed; the event's rebuild was skipped.
    pub reload_failures: usize,
    /// Events that were not writes or not on a watched path.
    pub ignored: usize,
    /// Errors reported by the event source.
    pub watcher_errors: usize,
}

/// State of one watch session.
pub struct WatchSession {
    set: Arc<WatchSet>,
    renderer: Arc<dyn Render>,
    /// Canonical forms of every watched path.
    watched: HashSet<PathBuf>,
    /// Canonical data path, if any.
    data_path: Option<PathBuf>,
    data: Arc<Value>,
    stats: SessionStats,
    span: Span,
}

impl WatchSession {
    /// Resolve the watched paths and load the initial data.
    ///
    /// Every log line of the session is emitted inside a `watch` span that
    /// names the entry template.
    ///
    /// A missing template or an unreadable data file is fatal here; later
    /// data failures are not.
    pub fn new(set: WatchSet, renderer: Arc<dyn Render>) -> Result<Self, WatchError> {
        let mut watched = HashSet::new();
        for path in set.watched_paths() {
            let canonical = std::fs::canonicalize(path).map_err(|e| io_err(path, e))?;
            watched.insert(canonical);
        }
        let data_path = match set.data() {
            Some(path) => Some(std::fs::canonicalize(path).map_err(|e| io_err(path, e))?),
            None => None,
        };
        let data = data::load(set.data())?;
        let span = tracing::info_span!("watch", entry = %set.entry().display());

        Ok(WatchSession {
            set: Arc::new(set),
            renderer,
            watched,
            data_path,
            data: Arc::new(data),
            stats: SessionStats::default(),
            span,
        })
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Subscribe `watcher` to every template and the data file.
    pub fn register(&self, watcher: &mut impl Watcher) -> Result<(), WatchError> {
        let _enter = self.span.enter();
        for path in self.set.watched_paths() {
            tracing::info!(path = %path.display(), "watching for changes");
            watcher
                .watch(path, RecursiveMode::NonRecursive)
                .map_err(|source| WatchError::Register {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Render once, then rebuild on every write event until the event queue
    /// closes or `shutdown` fires.
    pub async fn run(
        self,
        events: mpsc::UnboundedReceiver<FsEvent>,
        errors: mpsc::UnboundedReceiver<notify::Error>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<SessionStats, WatchError> {
        let span = self.span.clone();
        self.event_loop(events, errors, shutdown)
            .instrument(span)
            .await
    }

    async fn event_loop(
        mut self,
        mut events: mpsc::UnboundedReceiver<FsEvent>,
        mut errors: mpsc::UnboundedReceiver<notify::Error>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<SessionStats, WatchError> {
        self.rebuild().await?;

        let mut errors_open = true;
        let mut shutdown_open = true;

        loop {
            tokio::select! {
                biased;
                signal = shutdown.recv(), if shutdown_open => match signal {
                    Err(broadcast::error::RecvError::Closed) => shutdown_open = false,
                    _ => {
                        tracing::info!("shutdown requested, stopping watch");
                        break;
                    }
                },
                err = errors.recv(), if errors_open => match err {
                    Some(err) => {
                        self.stats.watcher_errors += 1;
                        tracing::warn!(error = %err, "error while watching");
                    }
                    None => errors_open = false,
                },
                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.handle_event(event).await?;
                }
            }
        }

        tracing::info!(
            rebuilds = self.stats.rebuilds,
            failed = self.stats.failed,
            reload_failures = self.stats.reload_failures,
            "watch session ended",
        );
        Ok(self.stats)
    }

    /// Process one event: ignore it, reload data, and/or rebuild.
    ///
    /// Only a broken output destination or a failed blocking task is
    /// returned as `Err`.
    pub async fn handle_event(&mut self, event: FsEvent) -> Result<(), WatchError> {
        if !event.write {
            self.stats.ignored += 1;
            tracing::trace!(path = %event.path.display(), "ignoring non-write event");
            return Ok(());
        }
        let Some(path) = self.resolve(&event.path) else {
            self.stats.ignored += 1;
            tracing::trace!(path = %event.path.display(), "ignoring unwatched path");
            return Ok(());
        };

        if self.data_path.as_ref() == Some(&path) && !self.reload_data(&path).await? {
            return Ok(());
        }

        tracing::debug!(path = %path.display(), "detected change, rebuilding");
        self.rebuild().await
    }

    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        if self.watched.contains(path) {
            return Some(path.to_path_buf());
        }
        std::fs::canonicalize(path)
            .ok()
            .filter(|canonical| self.watched.contains(canonical))
    }

    /// Returns `false` when the new data could not be loaded; the previous
    /// value stays in effect.
    async fn reload_data(&mut self, path: &Path) -> Result<bool, WatchError> {
        let path = path.to_path_buf();
        let loaded = tokio::task::spawn_blocking(move || data::load(Some(&path)))
            .await
            .map_err(|err| WatchError::Task(format!("data reload join error: {err}")))?;

        match loaded {
            Ok(value) => {
                self.data = Arc::new(value);
                self.stats.reloads += 1;
                Ok(true)
            }
            Err(err) => {
                self.stats.reload_failures += 1;
                tracing::error!(error = %err, "error reading data file, keeping previous data");
                Ok(false)
            }
        }
    }

    /// Run one rebuild pass with the current data and log its outcome.
    pub async fn rebuild(&mut self) -> Result<(), WatchError> {
        let set = Arc::clone(&self.set);
        let renderer = Arc::clone(&self.renderer);
        let data = Arc::clone(&self.data);
        let span = Span::current();

        let outcome = tokio::task::spawn_blocking(move || {
            span.in_scope(|| temple_build::rebuild(&set, renderer.as_ref(), &data))
        })
        .await
        .map_err(|err| WatchError::Task(format!("rebuild join error: {err}")))??;

        self.stats.rebuilds += 1;
        match outcome {
            RebuildOutcome::Built(summary) => {
                tracing::debug!(
                    output = %self.set.output(),
                    bytes = summary.bytes,
                    duration_ms = summary.duration.as_millis(),
                    "successful rebuild",
                );
            }
            RebuildOutcome::Failed(err) => {
                self.stats.failed += 1;
                tracing::error!(error = %err, "rebuild failed");
            }
        }
        Ok(())
    }
}

/// Watch `set` with the platform's recommended watcher until the session
/// ends.
pub async fn watch(
    set: WatchSet,
    renderer: Arc<dyn Render>,
    shutdown: broadcast::Receiver<()>,
) -> Result<SessionStats, WatchError> {
    let session = WatchSession::new(set, renderer)?;

    let (event_tx, event_rx) = mpsc::unbounded_channel::<FsEvent>();
    let (error_tx, error_rx) = mpsc::unbounded_channel::<notify::Error>();
    let mut watcher: RecommendedWatcher =
        recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for fs_event in FsEvent::from_notify(&event) {
                    let _ = event_tx.send(fs_event);
                }
            }
            Err(err) => {
                let _ = error_tx.send(err);
            }
        })?;

    session.register(&mut watcher)?;
    let result = session.run(event_rx, error_rx, shutdown).await;
    drop(watcher);
    result
}
