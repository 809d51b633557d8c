//! Heartbeat DTOs
//!
//! Data transfer objects for worker liveness reporting.

use serde::{Deserialize, Serialize};

/// Heartbeat sent by a worker to the master
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    /// Address (host:port) the worker serves its RPC surface on
    pub address: String,
}

/// Master's answer to a heartbeat
///
/// Carries the full known worker set so a newly joined worker learns its
/// peers from its first heartbeat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    /// Addresses of every worker the master currently knows about
    pub workers: Vec<String>,
}
