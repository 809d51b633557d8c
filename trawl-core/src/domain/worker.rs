//! Worker domain model
//!
//! Represents a crawl worker node tracked by the master.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness status of a worker node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerStatus {
    /// Worker is heartbeating on time and eligible for job assignment
    Running,

    /// Worker missed one heartbeat check window
    Hangup,

    /// Worker missed two consecutive check windows and is black-listed
    Stopped,
}

impl std::fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerStatus::Running => write!(f, "Running"),
            WorkerStatus::Hangup => write!(f, "Hangup"),
            WorkerStatus::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Liveness record for a single worker node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerInfo {
    /// Worker node address (host:port)
    pub address: String,

    /// Current liveness status
    pub status: WorkerStatus,

    /// Last time this worker sent a heartbeat
    pub last_heartbeat: DateTime<Utc>,

    /// Number of consecutive on-time heartbeats since the last gap
    pub consecutive_count: u32,
}

impl WorkerInfo {
    /// Creates the record for a worker seen for the first time.
    ///
    /// A brand new worker starts as Running; failure is only ever detected
    /// through missed heartbeats afterwards.
    pub fn new(address: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            address: address.into(),
            status: WorkerStatus::Running,
            last_heartbeat: now,
            consecutive_count: 0,
        }
    }
}
