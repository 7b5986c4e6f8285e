pub mod concepts;
pub mod courses;
pub mod handlers;
pub mod middleware;
pub mod modules;
pub mod prompts;
pub mod routes;

pub use routes::create_router;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Error body shared by all API endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub(crate) fn not_found(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::NOT_FOUND, message)
}

pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

pub(crate) fn conflict(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::CONFLICT, message)
}

pub(crate) fn internal(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

pub(crate) fn course_error(err: learncrafter_core::CourseError) -> ApiError {
    match &err {
        learncrafter_core::CourseError::NotFound(_) => not_found(err.to_string()),
        learncrafter_core::CourseError::Database(msg) => {
            tracing::error!(error = %msg, "store operation failed");
            internal("Internal server error")
        }
    }
}

pub(crate) fn prompt_error(err: learncrafter_core::PromptError) -> ApiError {
    match &err {
        learncrafter_core::PromptError::NotFound(_) => not_found(err.to_string()),
        learncrafter_core::PromptError::AlreadyExists(_) => conflict(err.to_string()),
        learncrafter_core::PromptError::Database(msg) => {
            tracing::error!(error = %msg, "prompt store operation failed");
            internal("Internal server error")
        }
    }
}
