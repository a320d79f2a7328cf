// crates/sync-engine/src/error.rs
//! Error types for sync operations

use crate::types::Operation;
use playsync_network::NetworkError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while mirroring a file event to the remote service
#[derive(Debug, Error)]
pub enum SyncError {
    /// The path has no parent directory to name a playlist after
    #[error("No playlist bucket for path: {}", .0.display())]
    NoBucket(PathBuf),

    /// The path could not be made absolute
    #[error("Cannot resolve absolute path for {}: {source}", .path.display())]
    PathResolution {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A request to the remote service failed
    #[error("{operation} failed for bucket '{bucket}' ({target}): {source}")]
    Transport {
        operation: Operation,
        bucket: String,
        target: String,
        #[source]
        source: NetworkError,
    },

    /// Network error outside a specific mutation
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}
