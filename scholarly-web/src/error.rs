//! HTTP error mapping

use crate::handlers::types::ErrorResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use scholarly_mail::MailError;
use scholarly_rag::RagError;
use tracing::{error, warn};

const UPSTREAM_MESSAGE: &str = "The assistant is temporarily unavailable. Please try again later.";
const INTERNAL_MESSAGE: &str = "An internal error occurred.";

/// Errors returned by API handlers, rendered as `{"error": ...}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a pipeline failure. Upstream details are only exposed in debug mode.
    pub fn from_rag(err: RagError, debug: bool) -> Self {
        match err {
            RagError::InvalidInput(message) => ApiError::BadRequest(message),
            err if err.is_upstream() => {
                error!(error = %err, "Chatbot upstream call failed");
                ApiError::Upstream(if debug {
                    err.to_string()
                } else {
                    UPSTREAM_MESSAGE.to_string()
                })
            }
            err => {
                error!(error = %err, "Chatbot query failed");
                ApiError::Internal(if debug {
                    err.to_string()
                } else {
                    INTERNAL_MESSAGE.to_string()
                })
            }
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::Validation { message, .. } => ApiError::BadRequest(message),
            MailError::QueueFull => {
                warn!("Contact queue is full, rejecting submission");
                ApiError::Unavailable(
                    "Too many pending messages. Please try again shortly.".to_string(),
                )
            }
            err => {
                error!(error = %err, "Contact submission failed");
                ApiError::Internal(INTERNAL_MESSAGE.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
