//! Trawl Worker Client
//!
//! HTTP client for the RPC contract every worker node exposes to the master.
//!
//! The master talks to many workers, so unlike a fixed-base-url client this
//! one takes the target worker address on every call. All requests carry an
//! explicit timeout so a hung node fails instead of stalling the caller.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use trawl_client::{WorkerClient, WorkerRpc};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trawl_client::ClientError> {
//!     let client = WorkerClient::new(Duration::from_secs(30))?;
//!     client.prepare("10.0.0.5:9101", "crawl1").await?;
//!     client.run_job("10.0.0.5:9101", "crawl1").await?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod rpc;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use rpc::WorkerRpc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the worker-node RPC surface
///
/// One instance serves the whole cluster; methods take the worker address
/// (host:port) they are aimed at. Covers:
/// - Job lifecycle on the worker (prepare, run, stop, clear, has_job)
/// - Peer membership updates (add_node, remove_node)
/// - Job package transfer (push_archive)
/// - Worker shutdown
#[derive(Debug, Clone)]
pub struct WorkerClient {
    /// HTTP client instance, configured with the per-request timeout
    client: Client,
}

impl WorkerClient {
    /// Create a new worker client
    ///
    /// # Arguments
    /// * `timeout` - Per-request timeout applied to every remote call
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Create a worker client with a custom HTTP client
    ///
    /// This allows configuring proxies, TLS settings, etc. The caller is
    /// responsible for setting a timeout on the client it provides.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn url(&self, address: &str, path: &str) -> String {
        format!("http://{}{}", address, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle a worker response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::worker_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle a worker response that returns no content
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::worker_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = WorkerClient::new(Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_url_formatting() {
        let client = WorkerClient::new(Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.url("10.0.0.5:9101", "/api/shutdown"),
            "http://10.0.0.5:9101/api/shutdown"
        );
    }
}
