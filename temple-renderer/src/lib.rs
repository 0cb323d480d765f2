//! # temple-renderer
//!
//! Tera-based template rendering behind a single [`Render`] capability, with a
//! plain-text and an HTML-escaping implementation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use temple_renderer::{Render, RenderMode};
//!
//! fn render_page(data: &serde_json::Value) {
//!     let renderer = RenderMode::Html.renderer();
//!     let templates = vec![PathBuf::from("page.html"), PathBuf::from("nav.html")];
//!     let mut out = Vec::new();
//!     if renderer.render(&templates, data, &mut out).is_ok() {
//!         println!("{} bytes", out.len());
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use engine::{HtmlRenderer, Render, RenderMode, TextRenderer};
pub use error::RenderError;
