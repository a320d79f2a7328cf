// crates/network/src/connectivity.rs
//! Reachability checks for a single service

use crate::client::Client;
use crate::error::{NetworkError, NetworkResult};
use std::time::{Duration, Instant};

/// Checks whether a remote service answers at all
#[derive(Clone)]
pub struct ConnectivityChecker {
    client: Client,
}

impl ConnectivityChecker {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns true if `url` answers with a 2xx status
    pub async fn is_reachable(&self, url: &str) -> bool {
        self.client.is_accessible(url).await
    }

    /// Checks `url` and reports how long the round trip took
    pub async fn probe(&self, url: &str) -> NetworkResult<Duration> {
        let start = Instant::now();
        match self.client.get(url).await {
            Ok(_) => Ok(start.elapsed()),
            Err(e) if e.is_connect() => Err(NetworkError::NetworkUnavailable),
            Err(e) => Err(e),
        }
    }
}
