// crates/sync-engine/src/lib.rs
//! Mirrors filesystem changes into remote playlists
//!
//! This crate turns file events into calls against the remote control API:
//! - Extension filtering of media files
//! - Mapping a file to its playlist (parent folder name) and item (absolute path)
//! - Reading an item's current position from the remote state document
//! - Adding and removing list entries
//! - Per-item ordering of concurrent work
//!
//! # Example
//!
//! ```no_run
//! use playsync_config::Config;
//! use playsync_sync_engine::{FileEvent, SyncController};
//! use std::path::PathBuf;
//!
//! # async fn run() -> playsync_sync_engine::SyncResult<()> {
//! let controller = SyncController::new(&Config::default())?;
//!
//! let report = controller
//!     .process(FileEvent::Created(PathBuf::from("/media/server1/test.mp4")))
//!     .await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

mod controller;
mod dispatcher;
mod endpoint;
mod error;
mod filter;
mod identity;
mod sequencer;
mod state;
mod types;

pub use controller::SyncController;
pub use dispatcher::MutationDispatcher;
pub use endpoint::RemoteEndpoint;
pub use error::{SyncError, SyncResult};
pub use filter::ExtensionFilter;
pub use identity::PlaylistIdentity;
pub use sequencer::{ItemSequencer, SequenceTicket};
pub use state::{find_position, RemoteStateReader};
pub use types::{
    EventReport, FileEvent, FileEventKind, Operation, Outcome, PlaylistTarget, Position,
};
