// crates/watcher/src/lib.rs
//! Folder watching for PlaySync
//!
//! Watches one or more root folders, waits for new files to finish writing,
//! and hands every change to a [`playsync_sync_engine::SyncController`].

mod aggregator;
mod error;
mod scan;
mod session;
mod settle;

pub use aggregator::{RootEvent, WatchRootAggregator};
pub use error::{WatchError, WatchResult};
pub use scan::scan_roots;
pub use session::{SessionHandle, SyncSession};
pub use settle::SettleTracker;
