//! Response envelope and error mapping.
//!
//! Every JSON body has the shape `{success, message, data?, error?}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MISSING_FIELD_MESSAGE: &str = "Name and age are required";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Request body too large";
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// JSON envelope shared by all endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error,
        }
    }
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Name or age absent or unusable.
    #[error("Name and age are required")]
    MissingField,

    /// Body could not be decoded as JSON or form data.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Body exceeded `security.max_body_size`.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Request exceeded `timeouts.request_secs`.
    #[error("Request timed out")]
    Timeout,

    /// Unexpected failure while handling the request.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::MissingField => ApiResponse::failure(MISSING_FIELD_MESSAGE, None),
            ApiError::InvalidBody(detail) => ApiResponse::failure(INVALID_BODY_MESSAGE, Some(detail)),
            ApiError::PayloadTooLarge => ApiResponse::failure(PAYLOAD_TOO_LARGE_MESSAGE, None),
            ApiError::Timeout => ApiResponse::failure(TIMEOUT_MESSAGE, None),
            ApiError::Internal(detail) => ApiResponse::failure(INTERNAL_ERROR_MESSAGE, Some(detail)),
        };
        (status, Json(body)).into_response()
    }
}
