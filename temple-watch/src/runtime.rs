use std::sync::Arc;

use tokio::sync::broadcast;

use temple_core::WatchSet;
use temple_renderer::Render;

use crate::error::{io_err, WatchError};
use crate::session::{watch, SessionStats};

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "TEMPLE_LOG";

/// Start a watch session and block the current thread until it exits.
///
/// Ctrl-C ends the session cleanly; so does the event source shutting down.
pub fn start_blocking(
    set: WatchSet,
    renderer: Arc<dyn Render>,
) -> Result<SessionStats, WatchError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(set, renderer))
}

/// Run a watch session until Ctrl-C or until the event source closes.
pub async fn run(set: WatchSet, renderer: Arc<dyn Render>) -> Result<SessionStats, WatchError> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

    let signal_handle = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("received ctrl-c, shutting down");
                let _ = shutdown_tx.send(());
            }
            Err(err) => tracing::warn!(error = %err, "ctrl-c handler failed"),
        }
    });

    let result = watch(set, renderer, shutdown_rx).await;
    signal_handle.abort();
    result
}

/// Install the global `fmt` subscriber, writing to stderr.
///
/// `TEMPLE_LOG` wins when set; otherwise `verbose` picks `debug` over `info`.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
