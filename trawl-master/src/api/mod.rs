//! API Module
//!
//! HTTP RPC surface of the master.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod job;
pub mod system;
pub mod worker;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::master::Master;

/// Create the main API router with all endpoints
pub fn create_router(master: Arc<Master>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Worker endpoints
        .route("/api/workers/heartbeat", post(worker::heartbeat))
        .route("/api/workers", get(worker::list_workers))
        // Job endpoints
        .route("/api/jobs/{name}/run", post(job::run_job))
        .route("/api/jobs/{name}/stop", post(job::stop_job))
        .route("/api/jobs", get(job::list_jobs))
        // Master control
        .route("/api/shutdown", post(system::shutdown))
        // Add state and middleware
        .with_state(master)
        .layer(TraceLayer::new_for_http())
}
