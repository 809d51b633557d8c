//! Node DTOs
//!
//! Data transfer objects for peer membership updates.

use serde::{Deserialize, Serialize};

/// A peer reference, sent to workers when a job's membership changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRef {
    /// Address (host:port) of the peer
    pub address: String,
}
