//! Registry Module
//!
//! In-memory cluster state for the master.
//! Each registry guards its own map with a lock; callers get owned
//! snapshots, never references into the live structures.

pub mod job;
pub mod worker;

// Re-export for convenience
pub use job::{JobController, JobRegistry};
pub use worker::{SweepReport, WorkerRegistry};
