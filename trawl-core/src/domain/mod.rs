//! Core domain types
//!
//! This module contains the core domain structures used across the Trawl
//! cluster. These types represent the fundamental entities shared between
//! the master (for tracking) and workers (for execution).

pub mod job;
pub mod worker;
