// crates/watcher/src/scan.rs
//! Initial walk of the watch roots

use crate::aggregator::{is_hidden, RootEvent};
use log::{debug, info, warn};
use playsync_config::WatchConfig;
use playsync_sync_engine::{ExtensionFilter, FileEvent};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Reports every existing supported file under `roots` as Created
///
/// Roots are expected to be canonical. Unreadable entries are logged and
/// skipped.
pub fn scan_roots(
    roots: &[PathBuf],
    filter: &ExtensionFilter,
    options: &WatchConfig,
) -> Vec<RootEvent> {
    let mut found = Vec::new();

    for root in roots {
        let mut walker = WalkDir::new(root).follow_links(false);
        if !options.recursive {
            walker = walker.max_depth(1);
        }

        let before = found.len();
        let entries = walker.into_iter().filter_entry(|entry| {
            !(options.ignore_hidden && is_hidden(root, entry.path()))
        });

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Error walking {}: {}", root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !filter.is_supported(entry.path()) {
                continue;
            }

            debug!("Found existing file: {}", entry.path().display());
            found.push(RootEvent::new(
                root.clone(),
                FileEvent::Created(entry.into_path()),
            ));
        }

        info!(
            "Found {} existing file(s) in {}",
            found.len() - before,
            root.display()
        );
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn filter() -> ExtensionFilter {
        ExtensionFilter::new([".mp4", ".mov"])
    }

    fn create_tree(root: &std::path::Path) {
        fs::create_dir_all(root.join("server1/nested")).expect("Failed to create dirs");
        fs::create_dir_all(root.join(".cache")).expect("Failed to create dirs");
        fs::write(root.join("top.mp4"), b"data").expect("Failed to write file");
        fs::write(root.join("server1/a.MOV"), b"data").expect("Failed to write file");
        fs::write(root.join("server1/notes.txt"), b"data").expect("Failed to write file");
        fs::write(root.join("server1/.hidden.mp4"), b"data").expect("Failed to write file");
        fs::write(root.join("server1/nested/b.mp4"), b"data").expect("Failed to write file");
        fs::write(root.join(".cache/c.mp4"), b"data").expect("Failed to write file");
    }

    fn names(events: &[RootEvent]) -> Vec<String> {
        let mut names: Vec<String> = events
            .iter()
            .filter_map(|e| e.event.path().file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_scan_finds_supported_visible_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        create_tree(temp_dir.path());

        let events = scan_roots(
            &[temp_dir.path().to_path_buf()],
            &filter(),
            &WatchConfig::default(),
        );

        assert_eq!(names(&events), vec!["a.MOV", "b.mp4", "top.mp4"]);
        assert!(events
            .iter()
            .all(|e| matches!(e.event, FileEvent::Created(_)) && e.root == temp_dir.path()));
    }

    #[test]
    fn test_scan_includes_hidden_when_allowed() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        create_tree(temp_dir.path());

        let options = WatchConfig {
            ignore_hidden: false,
            ..WatchConfig::default()
        };
        let events = scan_roots(&[temp_dir.path().to_path_buf()], &filter(), &options);
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_non_recursive_scan_stays_at_top() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        create_tree(temp_dir.path());

        let options = WatchConfig {
            recursive: false,
            ..WatchConfig::default()
        };
        let events = scan_roots(&[temp_dir.path().to_path_buf()], &filter(), &options);
        assert_eq!(names(&events), vec!["top.mp4"]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let events = scan_roots(
            &[PathBuf::from("/nonexistent/playsync/root")],
            &filter(),
            &WatchConfig::default(),
        );
        assert!(events.is_empty());
    }
}
