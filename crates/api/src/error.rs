//! Error-to-response mapping for handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use motortrack_core::generation::GenerationError;
use motortrack_core::workflow::WorkflowError;
use motortrack_shared::{AppError, JwtError};
use motortrack_store::DraftError;

/// Any error a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A workflow operation failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    /// The cash advance generator failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// Request or session level failure.
    #[error(transparent)]
    App(#[from] AppError),
}

impl ApiError {
    /// Shorthand for a malformed request.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::App(AppError::Validation(message.into()))
    }

    fn parts(&self) -> (u16, &'static str) {
        match self {
            Self::Workflow(e) => (e.status_code(), e.error_code()),
            Self::Generation(e) => (e.status_code(), e.error_code()),
            Self::App(e) => (e.status_code(), e.error_code()),
        }
    }
}

impl From<DraftError> for ApiError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::Generation(e) => Self::Generation(e),
            DraftError::Workflow(e) => Self::Workflow(e),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        Self::App(AppError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, error_code) = self.parts();
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({
                "error": error_code,
                "message": message
            })),
        )
            .into_response()
    }
}
