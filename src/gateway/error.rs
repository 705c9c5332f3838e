//! HTTP-facing error classification for the gateway surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("cache operation failed: {0}")]
    CacheFailure(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::CacheFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pipeline(PipelineError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::DeadlineExceeded) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Pipeline(PipelineError::EmbeddingUnavailable) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(PipelineError::StoreUnavailable(_))
            | ApiError::Pipeline(PipelineError::RerankerFailure(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        tracing::warn!(error = %self, status = status.as_u16(), "request failed");

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
