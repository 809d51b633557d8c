//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::master::MasterError;
use crate::store::StoreError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<MasterError> for ApiError {
    fn from(err: MasterError) -> Self {
        match err {
            MasterError::JobNotFound(_) => ApiError::NotFound(err.to_string()),
            MasterError::AlreadyRunning(_) => ApiError::Conflict(err.to_string()),
            MasterError::Store(StoreError::DescriptionMissing(_))
            | MasterError::Store(StoreError::PackageMissing(_)) => {
                ApiError::NotFound(err.to_string())
            }
            MasterError::Store(StoreError::InvalidDescription { .. }) => {
                ApiError::BadRequest(err.to_string())
            }
            _ => ApiError::InternalError(err.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
