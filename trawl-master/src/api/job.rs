//! Job API Handlers
//!
//! HTTP endpoints for job lifecycle and inspection.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use trawl_core::dto::job::{JobSummary, RunJobRequest};

use crate::api::error::ApiResult;
use crate::master::Master;

/// POST /api/jobs/{name}/run
/// Roll a job out to the cluster; blocks through the prepare and run phases
pub async fn run_job(
    State(master): State<Arc<Master>>,
    Path(name): Path<String>,
    Json(req): Json<RunJobRequest>,
) -> ApiResult<StatusCode> {
    tracing::info!("Run job requested: {} (unzip: {})", name, req.unzip);

    master.run_job(&name, req.unzip).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/jobs/{name}/stop
/// Tear a job down on its current worker set
pub async fn stop_job(
    State(master): State<Arc<Master>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    tracing::info!("Stop job requested: {}", name);

    master.stop_job(&name).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/jobs
/// List running jobs and their worker membership
pub async fn list_jobs(State(master): State<Arc<Master>>) -> Json<Vec<JobSummary>> {
    let jobs = master
        .job_controllers()
        .into_iter()
        .map(|controller| JobSummary {
            name: controller.job_name().to_string(),
            workers: controller.workers(),
        })
        .collect();

    Json(jobs)
}
