// crates/watcher/src/settle.rs
//! Holding new and changed files until writes have finished

use crate::aggregator::RootEvent;
use log::debug;
use playsync_sync_engine::FileEvent;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    len: u64,
    modified: Option<SystemTime>,
}

impl Snapshot {
    fn read(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

#[derive(Debug)]
struct Pending {
    order: u64,
    root_event: RootEvent,
    snapshot: Snapshot,
    stable_since: Instant,
}

/// Delays Created and Modified events until the file stops changing
///
/// A file is released once its size and modification time have stayed the
/// same for the stability threshold. Repeated events for a pending file
/// collapse into one, and a pending Created is never downgraded to Modified.
#[derive(Debug)]
pub struct SettleTracker {
    threshold: Duration,
    pending: HashMap<PathBuf, Pending>,
    next_order: u64,
}

impl SettleTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            pending: HashMap::new(),
            next_order: 0,
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Takes an incoming event, returning it if it should go out right away
    pub fn observe(&mut self, root_event: RootEvent, now: Instant) -> Option<RootEvent> {
        match &root_event.event {
            FileEvent::Created(path) | FileEvent::Modified(path) => {
                if self.threshold.is_zero() {
                    return Some(root_event);
                }

                let Some(snapshot) = Snapshot::read(path) else {
                    debug!("File vanished before settling: {}", path.display());
                    self.pending.remove(path);
                    return None;
                };

                let path = path.clone();
                match self.pending.get_mut(&path) {
                    Some(entry) => {
                        if !matches!(entry.root_event.event, FileEvent::Created(_)) {
                            entry.root_event = root_event;
                        }
                        if entry.snapshot != snapshot {
                            entry.snapshot = snapshot;
                            entry.stable_since = now;
                        }
                    }
                    None => {
                        let order = self.next_order;
                        self.next_order += 1;
                        self.pending.insert(
                            path,
                            Pending {
                                order,
                                root_event,
                                snapshot,
                                stable_since: now,
                            },
                        );
                    }
                }
                None
            }
            FileEvent::Removed(path) => {
                if self.pending.remove(path).is_some() {
                    debug!("Dropped pending event for removed file: {}", path.display());
                }
                Some(root_event)
            }
            FileEvent::Renamed { from, .. } => {
                self.pending.remove(from);
                Some(root_event)
            }
        }
    }

    /// Re-checks pending files, returning those that have settled
    pub fn poll(&mut self, now: Instant) -> Vec<RootEvent> {
        let mut settled = Vec::new();
        let mut vanished = Vec::new();

        for (path, entry) in self.pending.iter_mut() {
            match Snapshot::read(path) {
                None => vanished.push(path.clone()),
                Some(snapshot) if snapshot != entry.snapshot => {
                    entry.snapshot = snapshot;
                    entry.stable_since = now;
                }
                Some(_) => {
                    if now.saturating_duration_since(entry.stable_since) >= self.threshold {
                        settled.push((entry.order, path.clone()));
                    }
                }
            }
        }

        for path in vanished {
            debug!("File vanished before settling: {}", path.display());
            self.pending.remove(&path);
        }

        settled.sort_unstable();
        settled
            .into_iter()
            .filter_map(|(_, path)| self.pending.remove(&path))
            .map(|entry| entry.root_event)
            .collect()
    }
}
