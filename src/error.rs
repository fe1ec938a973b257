//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Remote fetch and local fallback both failed
    #[error("threat corpus unavailable: {0}")]
    DataUnavailable(String),

    /// A required field was missing for every record a view needed it on
    #[error("malformed records: {0}")]
    MalformedRecord(String),

    /// Description set too small or vocabulary empty
    #[error("vectorization failed: {0}")]
    VectorizationError(String),

    /// Cluster count outside [1, n_vectors]
    #[error("invalid cluster count: {0}")]
    InvalidClusterCount(String),

    /// Perplexity outside (0, n_points)
    #[error("invalid perplexity: {0}")]
    InvalidPerplexity(String),

    /// Generic errors
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::DataUnavailable(msg) => {
                tracing::error!("Corpus unavailable: {}", msg);
                (StatusCode::BAD_GATEWAY, "Threat data source unavailable")
            }
            AppError::MalformedRecord(msg) => {
                tracing::warn!("Malformed records: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, "Threat records are malformed")
            }
            AppError::VectorizationError(msg) => {
                tracing::warn!("Vectorization failed: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, "Descriptions cannot be vectorized")
            }
            AppError::InvalidClusterCount(msg) => {
                tracing::warn!("Bad cluster count: {}", msg);
                (StatusCode::BAD_REQUEST, "Invalid cluster count")
            }
            AppError::InvalidPerplexity(msg) => {
                tracing::warn!("Bad perplexity: {}", msg);
                (StatusCode::BAD_REQUEST, "Invalid perplexity")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("worker task failed: {}", err))
    }
}
