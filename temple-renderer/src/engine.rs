//! Tera rendering engine: the [`Render`] capability and its two variants.
//!
//! # Template naming
//!
//! Every file is registered under its file name (`layouts/base.html` becomes
//! `base.html`), so templates refer to each other by file name in
//! `{% include %}`, `{% extends %}` and `{% import %}`. When two files share a
//! name the later one wins. The first path in the list is the entry template.
//!
//! | Variant          | Escaping                                   |
//! |------------------|--------------------------------------------|
//! | [`TextRenderer`] | none                                       |
//! | [`HtmlRenderer`] | HTML-escapes every `{{ }}` expression      |

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tera::Tera;

use crate::context::build_context;
use crate::error::{io_err, RenderError};

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn template_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().replace('\\', "/"))
}

fn load_templates(paths: &[PathBuf]) -> Result<Vec<(String, String)>, RenderError> {
    let mut templates = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        templates.push((template_name(path), contents));
    }
    Ok(templates)
}

fn build_tera(paths: &[PathBuf], escape: bool) -> Result<(Tera, String), RenderError> {
    let entry = paths.first().ok_or(RenderError::NoTemplates)?;
    let entry = template_name(entry);

    let mut tera = Tera::default();
    // An empty suffix matches every template name.
    tera.autoescape_on(if escape { vec![""] } else { vec![] });
    tera.add_raw_templates(load_templates(paths)?)
        .map_err(RenderError::Parse)?;
    Ok((tera, entry))
}

fn render_with(
    templates: &[PathBuf],
    data: &Value,
    out: &mut dyn Write,
    escape: bool,
) -> Result<(), RenderError> {
    let (tera, entry) = build_tera(templates, escape)?;
    let ctx = build_context(data)?;
    tera.render_to(&entry, &ctx, out)
        .map_err(|source| RenderError::Execute {
            template: entry,
            source,
        })
}

// ---------------------------------------------------------------------------
// Render capability
// ---------------------------------------------------------------------------

/// Renders an ordered template set against a data value into a byte sink.
///
/// Templates are re-read from disk on every call, so a long-lived renderer
/// always sees the current file contents.
pub trait Render: Send + Sync {
    fn render(
        &self,
        templates: &[PathBuf],
        data: &Value,
        out: &mut dyn Write,
    ) -> Result<(), RenderError>;
}

/// Plain-text rendering: output is emitted verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl Render for TextRenderer {
    fn render(
        &self,
        templates: &[PathBuf],
        data: &Value,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        render_with(templates, data, out, false)
    }
}

/// HTML rendering: every interpolated value is escaped unless marked `| safe`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Render for HtmlRenderer {
    fn render(
        &self,
        templates: &[PathBuf],
        data: &Value,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        render_with(templates, data, out, true)
    }
}

// ---------------------------------------------------------------------------
// RenderMode
// ---------------------------------------------------------------------------

/// Which renderer to use, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    #[default]
    Text,
    Html,
}

impl RenderMode {
    pub fn from_html_flag(html: bool) -> Self {
        if html {
            RenderMode::Html
        } else {
            RenderMode::Text
        }
    }

    pub fn renderer(self) -> Box<dyn Render> {
        match self {
            RenderMode::Text => Box::new(TextRenderer),
            RenderMode::Html => Box::new(HtmlRenderer),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Text => write!(f, "text"),
            RenderMode::Html => write!(f, "html"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
