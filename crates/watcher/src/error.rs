// crates/watcher/src/error.rs
//! Error types for watch sessions

use std::path::PathBuf;
use thiserror::Error;

/// Result type for watch operations
pub type WatchResult<T> = Result<T, WatchError>;

/// Errors that can occur while starting or running a watch session
#[derive(Debug, Error)]
pub enum WatchError {
    /// The OS watcher could not be created for a root
    #[error("Failed to watch {}: {source}", .root.display())]
    Notify {
        root: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// Building the sync controller failed
    #[error("Sync error: {0}")]
    Sync(#[from] playsync_sync_engine::SyncError),

    /// The session task ended abnormally
    #[error("Session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
