//! Worker RPC operations
//!
//! The `WorkerRpc` trait is the operation contract the master holds against
//! every worker node. Production code uses the HTTP implementation on
//! `WorkerClient`; tests substitute recording mocks.

use async_trait::async_trait;
use trawl_core::dto::node::NodeRef;

use crate::WorkerClient;
use crate::error::Result;

/// RPC operations every worker node exposes to the master
#[async_trait]
pub trait WorkerRpc: Send + Sync {
    /// Whether the worker currently has any job loaded
    async fn has_job(&self, address: &str) -> Result<bool>;

    /// Prepare a job on the worker (set up its working state)
    async fn prepare(&self, address: &str, job_name: &str) -> Result<()>;

    /// Start an already-prepared job on the worker
    async fn run_job(&self, address: &str, job_name: &str) -> Result<()>;

    /// Stop a running job on the worker
    async fn stop_job(&self, address: &str, job_name: &str) -> Result<()>;

    /// Clear a stopped job's state from the worker
    async fn clear_job(&self, address: &str, job_name: &str) -> Result<()>;

    /// Tell the worker a peer joined its job partition group
    async fn add_node(&self, address: &str, peer: &str) -> Result<()>;

    /// Tell the worker a peer left its job partition group
    async fn remove_node(&self, address: &str, peer: &str) -> Result<()>;

    /// Shut the worker down
    async fn shutdown(&self, address: &str) -> Result<()>;

    /// Push a job archive to the worker for local extraction
    async fn push_archive(&self, address: &str, job_name: &str, bytes: Vec<u8>) -> Result<()>;
}

#[async_trait]
impl WorkerRpc for WorkerClient {
    async fn has_job(&self, address: &str) -> Result<bool> {
        let url = self.url(address, "/api/jobs/loaded");
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    async fn prepare(&self, address: &str, job_name: &str) -> Result<()> {
        tracing::debug!("prepare {} on {}", job_name, address);
        let url = self.url(address, &format!("/api/jobs/{}/prepare", job_name));
        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }

    async fn run_job(&self, address: &str, job_name: &str) -> Result<()> {
        tracing::debug!("run_job {} on {}", job_name, address);
        let url = self.url(address, &format!("/api/jobs/{}/run", job_name));
        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }

    async fn stop_job(&self, address: &str, job_name: &str) -> Result<()> {
        tracing::debug!("stop_job {} on {}", job_name, address);
        let url = self.url(address, &format!("/api/jobs/{}/stop", job_name));
        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }

    async fn clear_job(&self, address: &str, job_name: &str) -> Result<()> {
        tracing::debug!("clear_job {} on {}", job_name, address);
        let url = self.url(address, &format!("/api/jobs/{}/clear", job_name));
        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }

    async fn add_node(&self, address: &str, peer: &str) -> Result<()> {
        let url = self.url(address, "/api/nodes/add");
        let response = self
            .client
            .post(&url)
            .json(&NodeRef {
                address: peer.to_string(),
            })
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    async fn remove_node(&self, address: &str, peer: &str) -> Result<()> {
        let url = self.url(address, "/api/nodes/remove");
        let response = self
            .client
            .post(&url)
            .json(&NodeRef {
                address: peer.to_string(),
            })
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    async fn shutdown(&self, address: &str) -> Result<()> {
        tracing::debug!("shutdown worker {}", address);
        let url = self.url(address, "/api/shutdown");
        let response = self.client.post(&url).send().await?;

        self.handle_empty_response(response).await
    }

    async fn push_archive(&self, address: &str, job_name: &str, bytes: Vec<u8>) -> Result<()> {
        tracing::debug!(
            "pushing archive for {} to {} ({} bytes)",
            job_name,
            address,
            bytes.len()
        );
        let url = self.url(address, &format!("/api/files/{}", job_name));
        let response = self.client.put(&url).body(bytes).send().await?;

        self.handle_empty_response(response).await
    }
}
