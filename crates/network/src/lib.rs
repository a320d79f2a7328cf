// crates/network/src/lib.rs
//! HTTP plumbing for talking to the remote playlist service

mod client;
mod connectivity;
mod error;

pub use client::{Client, ClientConfig};
pub use connectivity::ConnectivityChecker;
pub use error::{NetworkError, NetworkResult};
