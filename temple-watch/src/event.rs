//! Filesystem event classification.
//!
//! A notify event may name several paths; each becomes one [`FsEvent`]. Only
//! content writes are flagged as `write`. Metadata changes, access, create,
//! rename and remove notifications are delivered but not actionable.

use std::path::PathBuf;

use notify::event::ModifyKind;
use notify::{Event, EventKind};

/// One filesystem notification for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub path: PathBuf,
    /// File content changed.
    pub write: bool,
}

impl FsEvent {
    pub fn write(path: impl Into<PathBuf>) -> Self {
        FsEvent {
            path: path.into(),
            write: true,
        }
    }

    pub fn other(path: impl Into<PathBuf>) -> Self {
        FsEvent {
            path: path.into(),
            write: false,
        }
    }

    /// Split a notify event into per-path events.
    pub fn from_notify(event: &Event) -> Vec<FsEvent> {
        let write = is_write(&event.kind);
        event
            .paths
            .iter()
            .map(|path| FsEvent {
                path: path.clone(),
                write,
            })
            .collect()
    }
}

/// Whether `kind` reports a content write.
///
/// Backends that cannot tell data from metadata changes report
/// `Modify(Any)`; those count as writes.
pub fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}
