// crates/watcher/src/aggregator.rs
//! One OS watcher per root, merged into a single event stream

use crate::error::{WatchError, WatchResult};
use log::{debug, error, info, warn};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Error as NotifyError, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use playsync_config::WatchConfig;
use playsync_sync_engine::FileEvent;
use std::path::{Component, Path, PathBuf};
use tokio::sync::mpsc;

/// A file event tagged with the root it was observed under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootEvent {
    pub root: PathBuf,
    pub event: FileEvent,
}

impl RootEvent {
    pub fn new(root: impl Into<PathBuf>, event: FileEvent) -> Self {
        Self {
            root: root.into(),
            event,
        }
    }
}

/// Watches several root directories at once
///
/// Each root gets its own watcher so every event can be traced back to the
/// root that produced it. Roots that cannot be watched yet are kept as
/// pending and picked up by [`retry_pending`](Self::retry_pending).
pub struct WatchRootAggregator {
    watchers: Vec<(PathBuf, RecommendedWatcher)>,
    pending: Vec<PathBuf>,
    options: WatchConfig,
    tx: mpsc::Sender<RootEvent>,
}

impl WatchRootAggregator {
    /// Starts watching `roots`, delivering events into `tx`
    ///
    /// Never fails: a root that is missing or unwatchable is logged once and
    /// left pending until a later retry succeeds.
    pub fn start(
        roots: &[PathBuf],
        options: &WatchConfig,
        tx: mpsc::Sender<RootEvent>,
    ) -> Self {
        let mut aggregator = Self {
            watchers: Vec::with_capacity(roots.len()),
            pending: Vec::new(),
            options: options.clone(),
            tx,
        };

        for root in roots {
            match watch_root(root, &aggregator.options, aggregator.tx.clone()) {
                Ok(entry) => {
                    info!("Watching folder: {}", entry.0.display());
                    aggregator.watchers.push(entry);
                }
                Err(e) => {
                    warn!("{}; will keep retrying", e);
                    aggregator.pending.push(root.clone());
                }
            }
        }

        aggregator
    }

    /// Roots actually being watched, canonicalized
    pub fn roots(&self) -> Vec<PathBuf> {
        self.watchers.iter().map(|(root, _)| root.clone()).collect()
    }

    /// Roots waiting to become watchable, as configured
    pub fn pending(&self) -> &[PathBuf] {
        &self.pending
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Tries to watch every pending root again
    ///
    /// Returns the canonicalized roots that are now being watched.
    pub fn retry_pending(&mut self) -> Vec<PathBuf> {
        let mut started = Vec::new();
        let mut still_pending = Vec::new();

        for root in std::mem::take(&mut self.pending) {
            match watch_root(&root, &self.options, self.tx.clone()) {
                Ok(entry) => {
                    info!("Watching folder: {}", entry.0.display());
                    started.push(entry.0.clone());
                    self.watchers.push(entry);
                }
                Err(e) => {
                    debug!("Still waiting for watch root: {}", e);
                    still_pending.push(root);
                }
            }
        }

        self.pending = still_pending;
        started
    }

    /// Drops the watch on a root whose directory went away
    ///
    /// The root goes back to pending so it is watched again once recreated.
    /// Returns false if `root` was not being watched.
    pub fn root_removed(&mut self, root: &Path) -> bool {
        let Some(index) = self.watchers.iter().position(|(r, _)| r == root) else {
            return false;
        };

        let (root, _watcher) = self.watchers.remove(index);
        warn!("Watch root removed: {}; will keep retrying", root.display());
        self.pending.push(root);
        true
    }

    pub fn is_running(&self) -> bool {
        !self.watchers.is_empty() || !self.pending.is_empty()
    }

    /// Releases every OS watch handle and forgets pending roots
    pub fn stop(&mut self) {
        self.pending.clear();
        if self.watchers.is_empty() {
            return;
        }

        info!("Stopping {} folder watcher(s)", self.watchers.len());
        self.watchers.clear();
    }
}

impl Drop for WatchRootAggregator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watch_root(
    root: &Path,
    options: &WatchConfig,
    tx: mpsc::Sender<RootEvent>,
) -> WatchResult<(PathBuf, RecommendedWatcher)> {
    // Events report resolved paths (e.g. /private/var on macOS)
    let root = root.canonicalize().map_err(|e| WatchError::Notify {
        root: root.to_path_buf(),
        source: NotifyError::io(e),
    })?;

    if !root.is_dir() {
        return Err(WatchError::Notify {
            source: NotifyError::path_not_found().add_path(root.clone()),
            root,
        });
    }

    let event_root = root.clone();
    let ignore_hidden = options.ignore_hidden;

    let mut watcher =
        notify::recommended_watcher(move |res: Result<Event, NotifyError>| match res {
            Ok(event) => {
                for file_event in translate(event) {
                    if ignore_hidden && is_hidden(&event_root, file_event.path()) {
                        continue;
                    }

                    debug!("{} (root {})", file_event, event_root.display());
                    if tx
                        .blocking_send(RootEvent::new(event_root.clone(), file_event))
                        .is_err()
                    {
                        debug!("Event channel closed for {}", event_root.display());
                        return;
                    }
                }
            }
            Err(e) => error!("Watch error under {}: {}", event_root.display(), e),
        })
        .map_err(|source| WatchError::Notify {
            root: root.clone(),
            source,
        })?;

    let mode = if options.recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };

    watcher.watch(&root, mode).map_err(|source| WatchError::Notify {
        root: root.clone(),
        source,
    })?;

    Ok((root, watcher))
}

/// Maps a raw notify event to file events
///
/// Rename halves become a removal of the old path and a creation of the new
/// one. Directory events and access or metadata changes are dropped.
pub(crate) fn translate(event: Event) -> Vec<FileEvent> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => Vec::new(),
        EventKind::Create(_) => event
            .paths
            .into_iter()
            .filter(|p| !p.is_dir())
            .map(FileEvent::Created)
            .collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => event.paths.into_iter().map(FileEvent::Removed).collect(),
            RenameMode::To => event
                .paths
                .into_iter()
                .filter(|p| !p.is_dir())
                .map(FileEvent::Created)
                .collect(),
            // Both halves are also delivered separately as From and To
            RenameMode::Both => Vec::new(),
            RenameMode::Any | RenameMode::Other => event
                .paths
                .into_iter()
                .filter_map(|p| {
                    if p.is_dir() {
                        None
                    } else if p.exists() {
                        Some(FileEvent::Created(p))
                    } else {
                        Some(FileEvent::Removed(p))
                    }
                })
                .collect(),
        },
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => event
            .paths
            .into_iter()
            .filter(|p| p.is_file())
            .map(FileEvent::Modified)
            .collect(),
        EventKind::Remove(_) => event.paths.into_iter().map(FileEvent::Removed).collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

/// True if any component of `path` below `root` starts with a dot
pub(crate) fn is_hidden(root: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::RemoveKind;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn event(kind: EventKind, paths: &[&Path]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |e, p| e.add_path(p.to_path_buf()))
    }

    #[test]
    fn test_rename_halves_become_remove_and_create() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let new_path = temp_dir.path().join("b.mp4");
        fs::write(&new_path, b"data").expect("Failed to write file");
        let old_path = temp_dir.path().join("a.mp4");

        let from = translate(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &[&old_path],
        ));
        let to = translate(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &[&new_path],
        ));
        let both = translate(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &[&old_path, &new_path],
        ));

        assert_eq!(from, vec![FileEvent::Removed(old_path.clone())]);
        assert_eq!(to, vec![FileEvent::Created(new_path.clone())]);
        assert!(both.is_empty());
    }

    #[test]
    fn test_ambiguous_rename_checks_existence() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let present = temp_dir.path().join("here.mp4");
        fs::write(&present, b"data").expect("Failed to write file");
        let gone = temp_dir.path().join("gone.mp4");

        let events = translate(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)),
            &[&present, &gone],
        ));

        assert_eq!(
            events,
            vec![FileEvent::Created(present), FileEvent::Removed(gone)]
        );
    }

    #[test]
    fn test_directories_and_access_are_ignored() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("server1");
        fs::create_dir(&dir).expect("Failed to create dir");

        assert!(translate(event(EventKind::Create(CreateKind::Any), &[&dir])).is_empty());
        assert!(translate(event(EventKind::Create(CreateKind::Folder), &[&dir])).is_empty());
        assert!(translate(event(
            EventKind::Access(notify::event::AccessKind::Any),
            &[&dir]
        ))
        .is_empty());
    }

    #[test]
    fn test_remove_is_forwarded() {
        let path = PathBuf::from("/media/server1/test.mp4");
        let events = translate(event(EventKind::Remove(RemoveKind::File), &[&path]));
        assert_eq!(events, vec![FileEvent::Removed(path)]);
    }

    #[test]
    fn test_hidden_paths() {
        let root = Path::new("/media");
        assert!(is_hidden(root, Path::new("/media/server1/.test.mp4")));
        assert!(is_hidden(root, Path::new("/media/.cache/test.mp4")));
        assert!(!is_hidden(root, Path::new("/media/server1/test.mp4")));
        assert!(!is_hidden(Path::new("/home/u/.media"), Path::new("/home/u/.media/s/a.mp4")));
    }

    #[test]
    fn test_missing_roots_are_pending() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (tx, _rx) = mpsc::channel(10);
        let missing = temp_dir.path().join("missing");
        let roots = vec![missing.clone(), temp_dir.path().to_path_buf()];

        let aggregator = WatchRootAggregator::start(&roots, &WatchConfig::default(), tx);
        assert_eq!(aggregator.roots().len(), 1);
        assert_eq!(aggregator.pending(), &[missing][..]);
    }

    #[test]
    fn test_root_created_later_is_watched_on_retry() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (tx, _rx) = mpsc::channel(10);
        let late = temp_dir.path().join("late");

        let mut aggregator =
            WatchRootAggregator::start(&[late.clone()], &WatchConfig::default(), tx);
        assert!(aggregator.roots().is_empty());
        assert!(aggregator.has_pending());
        assert!(aggregator.is_running());

        assert!(aggregator.retry_pending().is_empty());
        assert!(aggregator.has_pending());

        fs::create_dir(&late).expect("Failed to create dir");
        let late = late.canonicalize().expect("Failed to canonicalize");
        assert_eq!(aggregator.retry_pending(), vec![late.clone()]);
        assert_eq!(aggregator.roots(), vec![late]);
        assert!(!aggregator.has_pending());
    }

    #[test]
    fn test_removed_root_goes_back_to_pending() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let (tx, _rx) = mpsc::channel(10);
        let root = temp_dir.path().canonicalize().expect("Failed to canonicalize");

        let mut aggregator =
            WatchRootAggregator::start(&[root.clone()], &WatchConfig::default(), tx);
        assert!(!aggregator.root_removed(Path::new("/not/a/root")));
        assert!(aggregator.root_removed(&root));
        assert!(aggregator.roots().is_empty());
        assert_eq!(aggregator.pending(), &[root.clone()][..]);

        // The directory still exists, so the next retry re-attaches it
        assert_eq!(aggregator.retry_pending(), vec![root]);
    }

    #[tokio::test]
    async fn test_events_are_tagged_with_root() {
        let first = TempDir::new().expect("Failed to create temp dir");
        let second = TempDir::new().expect("Failed to create temp dir");
        let (tx, mut rx) = mpsc::channel(100);

        let mut aggregator = WatchRootAggregator::start(
            &[first.path().to_path_buf(), second.path().to_path_buf()],
            &WatchConfig::default(),
            tx,
        );

        tokio::time::sleep(Duration::from_millis(200)).await;
        fs::write(second.path().join("clip.mp4"), b"data").expect("Failed to write file");

        let received = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(root_event) = rx.recv().await {
                if root_event.event.path().ends_with("clip.mp4") {
                    return Some(root_event);
                }
            }
            None
        })
        .await
        .expect("Timed out waiting for event")
        .expect("Channel closed");

        let second_root = second.path().canonicalize().expect("Failed to canonicalize");
        assert_eq!(received.root, second_root);

        aggregator.stop();
        assert!(!aggregator.is_running());
    }

    #[tokio::test]
    async fn test_hidden_files_are_not_delivered() {
        let root = TempDir::new().expect("Failed to create temp dir");
        let (tx, mut rx) = mpsc::channel(100);
        let _aggregator = WatchRootAggregator::start(
            &[root.path().to_path_buf()],
            &WatchConfig::default(),
            tx,
        );

        tokio::time::sleep(Duration::from_millis(200)).await;
        fs::write(root.path().join(".hidden.mp4"), b"data").expect("Failed to write file");
        fs::write(root.path().join("visible.mp4"), b"data").expect("Failed to write file");

        let received = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("Timed out waiting for event")
            .expect("Channel closed");
        assert!(received.event.path().ends_with("visible.mp4"));
    }
}
