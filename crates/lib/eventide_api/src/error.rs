//! Application error types.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use eventide_core::chat::ChatTurnError;
use eventide_core::events::EventError;
use eventide_core::rate_limit::RateLimitExceeded;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited: retry after {0}s")]
    RateLimited(u64),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.clone()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone()),
            AppError::RateLimited(secs) => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                format!("Too many requests, retry after {secs}s"),
            ),
            AppError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });
        let mut response = (status, body).into_response();
        if let AppError::RateLimited(secs) = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<EventError> for AppError {
    fn from(e: EventError) -> Self {
        match e {
            EventError::NotFound(id) => AppError::NotFound(format!("event {id}")),
            EventError::MissingId => AppError::Validation("event has no identifier".into()),
            EventError::Validation(msg) => AppError::Validation(msg),
            EventError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<RateLimitExceeded> for AppError {
    fn from(e: RateLimitExceeded) -> Self {
        AppError::RateLimited(e.retry_after_secs())
    }
}

impl From<ChatTurnError> for AppError {
    fn from(e: ChatTurnError) -> Self {
        match e {
            ChatTurnError::EmptyPrompt => AppError::Validation("prompt must not be empty".into()),
            ChatTurnError::RateLimited(limit) => AppError::from(limit),
        }
    }
}
