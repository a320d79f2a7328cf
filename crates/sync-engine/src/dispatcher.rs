// crates/sync-engine/src/dispatcher.rs
//! Sending list mutations to the remote service

use crate::endpoint::RemoteEndpoint;
use crate::error::{SyncError, SyncResult};
use crate::types::{Operation, PlaylistTarget, Position};
use playsync_network::Client;

/// Issues `ListAdd` and `ListRemove` calls
///
/// Each call is made once. Failures are logged with their context and
/// returned; nothing is retried.
#[derive(Clone)]
pub struct MutationDispatcher {
    client: Client,
    endpoint: RemoteEndpoint,
}

impl MutationDispatcher {
    pub fn new(client: Client, endpoint: RemoteEndpoint) -> Self {
        Self { client, endpoint }
    }

    /// Appends the item to the end of its bucket's list
    pub async fn add(&self, target: &PlaylistTarget) -> SyncResult<()> {
        let url = self.endpoint.add_url(target);

        match self.client.get(&url).await {
            Ok(_) => {
                log::info!("Added {} to list \"{}\"", target.item, target.bucket);
                Ok(())
            }
            Err(source) => {
                log::error!(
                    "Error adding {} to list \"{}\": {}",
                    target.item,
                    target.bucket,
                    source
                );
                Err(SyncError::Transport {
                    operation: Operation::Add,
                    bucket: target.bucket.clone(),
                    target: target.item.clone(),
                    source,
                })
            }
        }
    }

    /// Removes the entry at `position` from the bucket's list
    pub async fn remove(&self, bucket: &str, position: Position) -> SyncResult<()> {
        let url = self.endpoint.remove_url(bucket, position);

        match self.client.get(&url).await {
            Ok(_) => {
                log::info!("Removed item {} from list \"{}\"", position, bucket);
                Ok(())
            }
            Err(source) => {
                log::error!(
                    "Error removing item {} from list \"{}\": {}",
                    position,
                    bucket,
                    source
                );
                Err(SyncError::Transport {
                    operation: Operation::Remove,
                    bucket: bucket.to_string(),
                    target: position.to_string(),
                    source,
                })
            }
        }
    }
}
