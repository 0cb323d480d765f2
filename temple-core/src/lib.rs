//! temple core library: build descriptions and data loading.
//!
//! Public API surface:
//! - [`types`] [`WatchSet`] and [`OutputTarget`]
//! - [`data`] data file loading
//! - [`error`] [`CoreError`], [`DataError`]

pub mod data;
pub mod error;
pub mod types;

pub use error::{CoreError, DataError};
pub use types::{OutputTarget, WatchSet};
