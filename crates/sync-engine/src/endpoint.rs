// crates/sync-engine/src/endpoint.rs
//! URL construction for the remote control API

use crate::types::{Operation, PlaylistTarget, Position};

/// Base address of the remote playlist service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    base: String,
}

impl RemoteEndpoint {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let base = base.trim().trim_end_matches('/').to_string();
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// URL returning the full XML state document
    pub fn state_url(&self) -> String {
        format!("{}/api", self.base)
    }

    /// `ListAdd` URL; the item is percent-encoded, the bucket is sent as-is
    pub fn add_url(&self, target: &PlaylistTarget) -> String {
        self.function_url(
            Operation::Add,
            &target.bucket,
            &urlencoding::encode(&target.item),
        )
    }

    /// `ListRemove` URL for the item at `position`
    pub fn remove_url(&self, bucket: &str, position: Position) -> String {
        self.function_url(Operation::Remove, bucket, &position.to_string())
    }

    fn function_url(&self, operation: Operation, input: &str, value: &str) -> String {
        format!(
            "{}/api/?Function={}&Input={}&Value={}",
            self.base,
            operation.function(),
            input,
            value
        )
    }
}
