// crates/sync-engine/src/identity.rs
//! Mapping local paths to remote playlist targets

use crate::error::{SyncError, SyncResult};
use crate::types::PlaylistTarget;
use std::path::{Component, Path, PathBuf};

/// Derives the remote bucket and item for a local file
///
/// The bucket is the name of the file's immediate parent directory and the
/// item is the file's absolute path. Nothing is cached, so two roots with
/// identically named subfolders map to the same bucket.
pub struct PlaylistIdentity;

impl PlaylistIdentity {
    pub fn identify(path: &Path) -> SyncResult<PlaylistTarget> {
        let absolute = Self::normalize(path)?;

        let bucket = absolute
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| SyncError::NoBucket(absolute.clone()))?;

        Ok(PlaylistTarget::new(
            bucket,
            absolute.to_string_lossy().into_owned(),
        ))
    }

    /// Makes a path absolute and drops `.` and `..` components
    ///
    /// Resolution is purely lexical so it also works for files that no longer
    /// exist. Symlinks are not followed.
    pub fn normalize(path: &Path) -> SyncResult<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|source| SyncError::PathResolution {
                    path: path.to_path_buf(),
                    source,
                })?
                .join(path)
        };

        let mut normalized = PathBuf::new();
        for component in absolute.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    normalized.pop();
                }
                other => normalized.push(other.as_os_str()),
            }
        }

        Ok(normalized)
    }
}
