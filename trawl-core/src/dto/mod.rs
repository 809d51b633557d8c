//! Data Transfer Objects for master/worker communication
//!
//! This module contains DTOs exchanged over the cluster RPC surface.
//! DTOs are lightweight representations of domain entities optimized for
//! network transfer.

pub mod heartbeat;
pub mod job;
pub mod node;
