//! System API Handlers
//!
//! Master-level control endpoints.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode};

use crate::master::Master;

/// POST /api/shutdown
/// Drain and stop the master: running jobs are torn down, every known
/// worker receives a shutdown broadcast, then the listener itself exits
pub async fn shutdown(State(master): State<Arc<Master>>) -> StatusCode {
    tracing::info!("Shutdown requested over RPC");

    master.shutdown().await;

    StatusCode::NO_CONTENT
}
