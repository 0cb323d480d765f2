//! Temple: render Tera templates against a JSON or YAML data file.
//!
//! # Usage
//!
//! ```text
//! temple [--html] [-w|--watch] [-v|--verbose] [-d <DATA>] [-o <OUTPUT>] <TEMPLATE>...
//! ```
//!
//! The first template is the entry point; the rest are available to it for
//! `extends`, `include` and `import`.

mod commands;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use temple_core::{OutputTarget, WatchSet};
use temple_renderer::RenderMode;

#[derive(Parser, Debug)]
#[command(
    name = "temple",
    version,
    about = "Render templates with a data file, optionally re-rendering on change",
    long_about = None,
)]
struct Cli {
    /// Escape template output for HTML.
    #[arg(long)]
    html: bool,

    /// Keep running and re-render whenever a template or the data file is written.
    #[arg(short = 'w', long)]
    watch: bool,

    /// Log at debug level (overridden by TEMPLE_LOG).
    #[arg(short, long)]
    verbose: bool,

    /// JSON or YAML file whose contents are passed to the templates.
    #[arg(short = 'd', long, value_name = "DATA", default_value = "", hide_default_value = true)]
    data: String,

    /// Write output to this file instead of stdout.
    #[arg(short = 'o', long, value_name = "OUTPUT", default_value = "", hide_default_value = true)]
    output: String,

    /// Templates to load; the first one is rendered.
    #[arg(value_name = "TEMPLATE")]
    templates: Vec<PathBuf>,
}

impl Cli {
    fn watch_set(&self) -> Result<WatchSet> {
        let output = OutputTarget::from_arg(&self.output);
        let data = Some(PathBuf::from(&self.data));
        WatchSet::new(self.templates.clone(), data, output).context("invalid arguments")
    }
}

/// Usage errors exit with 1 like every other startup failure; `--help` and
/// `--version` keep their own status.
fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            process::exit(1);
        }
        Err(err) => err.exit(),
    }
}

fn main() -> Result<()> {
    let cli = parse_args();
    temple_watch::init_tracing(cli.verbose);

    let set = cli.watch_set()?;
    let mode = RenderMode::from_html_flag(cli.html);

    if cli.watch {
        commands::watch::run(set, mode)
    } else {
        commands::render::run(&set, mode)
    }
}
