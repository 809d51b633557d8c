//! Job DTOs
//!
//! Data transfer objects for job lifecycle operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::worker::{WorkerInfo, WorkerStatus};

/// Request to start a job on the cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunJobRequest {
    /// Whether the master should extract the uploaded job archive first
    #[serde(default)]
    pub unzip: bool,
}

/// Summary of a running job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    /// Job name
    pub name: String,

    /// Workers currently assigned to the job
    pub workers: Vec<String>,
}

/// Summary information about a tracked worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSummary {
    /// Worker address
    pub address: String,

    /// Current liveness status
    pub status: WorkerStatus,

    /// Last time this worker sent a heartbeat
    pub last_heartbeat: DateTime<Utc>,

    /// Consecutive on-time heartbeats since the last gap
    pub consecutive_count: u32,
}

impl From<WorkerInfo> for WorkerSummary {
    fn from(info: WorkerInfo) -> Self {
        WorkerSummary {
            address: info.address,
            status: info.status,
            last_heartbeat: info.last_heartbeat,
            consecutive_count: info.consecutive_count,
        }
    }
}
