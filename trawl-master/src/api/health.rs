//! Liveness endpoint for the master process itself.
//!
//! Answers as soon as the HTTP server is up, independent of worker or
//! job state.

use axum::{http::StatusCode, response::IntoResponse};

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
