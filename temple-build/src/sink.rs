//! Output sink: the destination of one build pass.
//!
//! ## Lifecycle
//!
//! 1. [`Sink::open`] resolves the [`OutputTarget`]: a named file is created or
//!    truncated, standard output is borrowed.
//! 2. The renderer writes through the sink; bytes are counted and hashed on
//!    the way through.
//! 3. [`Sink::close`] flushes. A named file is released; standard output is
//!    flushed but stays open for the next pass.
//!
//! There is no write-then-rename: a pass that fails halfway leaves whatever
//! was written so far in the output file.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use temple_core::OutputTarget;

use crate::error::BuildError;

enum Destination {
    Stdout(io::Stdout),
    File { path: PathBuf, writer: BufWriter<File> },
}

/// Totals for everything written through a [`Sink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSummary {
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the bytes written.
    pub digest: String,
}

/// Writable handle for one build pass.
pub struct Sink {
    dest: Destination,
    bytes: u64,
    hasher: Sha256,
}

impl Sink {
    /// Open the destination for `target`.
    pub fn open(target: &OutputTarget) -> Result<Self, BuildError> {
        let dest = match target {
            OutputTarget::Stdout => Destination::Stdout(io::stdout()),
            OutputTarget::File(path) => Destination::File {
                path: path.clone(),
                writer: BufWriter::new(create_truncate(path)?),
            },
        };
        Ok(Sink {
            dest,
            bytes: 0,
            hasher: Sha256::new(),
        })
    }

    /// Flush and release the destination.
    ///
    /// Failing to flush a named file is an error. Standard output is never
    /// closed; a failed flush there is only logged.
    pub fn close(self) -> Result<SinkSummary, BuildError> {
        let summary = SinkSummary {
            bytes: self.bytes,
            digest: hex::encode(self.hasher.finalize()),
        };

        match self.dest {
            Destination::Stdout(mut stdout) => {
                if let Err(err) = stdout.flush() {
                    tracing::warn!(error = %err, "failed to flush stdout");
                }
            }
            Destination::File { path, writer } => {
                // Dropping the file closes it; only the flush can fail here.
                writer
                    .into_inner()
                    .map_err(|e| BuildError::Close {
                        path,
                        source: e.into_error(),
                    })?;
            }
        }

        Ok(summary)
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match &mut self.dest {
            Destination::Stdout(stdout) => stdout.write(buf)?,
            Destination::File { writer, .. } => writer.write(buf)?,
        };
        self.bytes += n as u64;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.dest {
            Destination::Stdout(stdout) => stdout.flush(),
            Destination::File { writer, .. } => writer.flush(),
        }
    }
}

fn create_truncate(path: &Path) -> Result<File, BuildError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    set_file_mode(&mut options);
    options.open(path).map_err(|source| BuildError::Open {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn set_file_mode(options: &mut OpenOptions) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o644);
}

#[cfg(not(unix))]
fn set_file_mode(_options: &mut OpenOptions) {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
