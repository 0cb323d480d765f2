//! Watch mode: filesystem event classification, the rebuild loop, and the
//! blocking runtime entrypoint.

mod error;
pub mod event;
mod runtime;
pub mod session;

pub use error::WatchError;
pub use event::{is_write, FsEvent};
pub use runtime::{init_tracing, run, start_blocking, LOG_ENV};
pub use session::{watch, SessionStats, WatchSession};
