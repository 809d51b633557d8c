//! Worker API Handlers
//!
//! HTTP endpoints for worker liveness and inspection.

use std::sync::Arc;

use axum::{Json, extract::State};
use trawl_core::dto::heartbeat::{HeartbeatRequest, HeartbeatResponse};
use trawl_core::dto::job::WorkerSummary;

use crate::api::error::ApiResult;
use crate::master::Master;

/// POST /api/workers/heartbeat
/// Record a worker heartbeat; returns the full known worker set so the
/// sender learns its peers
pub async fn heartbeat(
    State(master): State<Arc<Master>>,
    Json(req): Json<HeartbeatRequest>,
) -> ApiResult<Json<HeartbeatResponse>> {
    tracing::debug!("Heartbeat from worker: {}", req.address);

    let workers = master.register_heartbeat(&req.address);

    Ok(Json(HeartbeatResponse { workers }))
}

/// GET /api/workers
/// List every tracked worker with its liveness state
pub async fn list_workers(State(master): State<Arc<Master>>) -> Json<Vec<WorkerSummary>> {
    let workers = master
        .worker_infos()
        .into_iter()
        .map(WorkerSummary::from)
        .collect();

    Json(workers)
}
