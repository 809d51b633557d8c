//! Trawl Core
//!
//! Core types and abstractions for the Trawl crawl cluster.
//!
//! This crate contains:
//! - Domain types: Core business entities (WorkerInfo, JobDescription, etc.)
//! - DTOs: Data transfer objects for master/worker communication

pub mod domain;
pub mod dto;
