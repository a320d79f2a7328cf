// crates/sync-engine/src/types.rs
//! Core sync types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of filesystem change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileEventKind {
    Created,
    Modified,
    Removed,
    Renamed,
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileEventKind::Created => write!(f, "created"),
            FileEventKind::Modified => write!(f, "modified"),
            FileEventKind::Removed => write!(f, "removed"),
            FileEventKind::Renamed => write!(f, "renamed"),
        }
    }
}

/// A filesystem change delivered by the watch layer
///
/// Events are consumed once by the controller and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Removed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
}

impl FileEvent {
    pub fn kind(&self) -> FileEventKind {
        match self {
            FileEvent::Created(_) => FileEventKind::Created,
            FileEvent::Modified(_) => FileEventKind::Modified,
            FileEvent::Removed(_) => FileEventKind::Removed,
            FileEvent::Renamed { .. } => FileEventKind::Renamed,
        }
    }

    /// The path the event is about; the new path for renames
    pub fn path(&self) -> &Path {
        match self {
            FileEvent::Created(p) | FileEvent::Modified(p) | FileEvent::Removed(p) => p,
            FileEvent::Renamed { to, .. } => to,
        }
    }

    /// Every path the event touches
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            FileEvent::Created(p) | FileEvent::Modified(p) | FileEvent::Removed(p) => vec![p],
            FileEvent::Renamed { from, to } => vec![from, to],
        }
    }
}

impl fmt::Display for FileEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileEvent::Renamed { from, to } => {
                write!(f, "renamed {} -> {}", from.display(), to.display())
            }
            other => write!(f, "{} {}", other.kind(), other.path().display()),
        }
    }
}

/// A remote playlist bucket and the item value inside it
///
/// Always derived from the current event's path, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaylistTarget {
    /// Name of the remote list (parent directory name)
    pub bucket: String,
    /// Absolute, normalized file path
    pub item: String,
}

impl PlaylistTarget {
    pub fn new(bucket: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            item: item.into(),
        }
    }
}

impl fmt::Display for PlaylistTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in \"{}\"", self.item, self.bucket)
    }
}

/// 1-based index of an item within a remote list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(usize);

impl Position {
    /// Returns `None` for 0, which is not a valid position
    pub fn new(index: usize) -> Option<Self> {
        if index == 0 {
            None
        } else {
            Some(Self(index))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote operation, named after the control API function where there is one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    StateRead,
}

impl Operation {
    /// Control API function name
    pub fn function(self) -> &'static str {
        match self {
            Operation::Add => "ListAdd",
            Operation::Remove => "ListRemove",
            Operation::StateRead => "StateRead",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function())
    }
}

/// Result of one half of an event's handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added {
        target: PlaylistTarget,
    },
    Removed {
        target: PlaylistTarget,
        position: Position,
    },
    /// The item is not in the remote list (or the state could not be read)
    NotFound {
        target: PlaylistTarget,
    },
    /// Nothing was sent for this path
    Skipped {
        path: PathBuf,
        reason: String,
    },
    Failed {
        operation: Operation,
        target: PlaylistTarget,
        error: String,
    },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Everything that happened while handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReport {
    pub event: FileEvent,
    pub outcomes: Vec<Outcome>,
}

impl EventReport {
    pub fn new(event: FileEvent) -> Self {
        Self {
            event,
            outcomes: Vec::new(),
        }
    }

    /// True when no remote call failed
    pub fn is_success(&self) -> bool {
        !self.outcomes.iter().any(Outcome::is_failure)
    }
}
