//! # temple-build
//!
//! Output sink and rebuild coordination.
//!
//! Call [`rebuild`] to render a [`WatchSet`](temple_core::WatchSet) once with
//! an already-loaded data value, or [`render_once`] to load the data file
//! first and treat every failure as an error.

pub mod error;
pub mod rebuild;
pub mod sink;

pub use error::{BuildError, PassError};
pub use rebuild::{rebuild, render_once, BuildSummary, RebuildOutcome};
pub use sink::{Sink, SinkSummary};
