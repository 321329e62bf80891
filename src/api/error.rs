use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use super::ApiResponse;
use crate::services::{TokenError, UploadError};

/// One failed check in a validation pass. Checks are collected, not
/// fail-fast, so a bad request reports every problem at once.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    Validation(Vec<FieldError>),

    BadRequest(String),

    Unauthorized(String),

    Forbidden(String),

    Conflict(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Validation(errors) => write!(f, "Validation failed ({} errors)", errors.len()),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            ApiError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            ApiError::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, field_errors) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = ApiResponse::<()>::error(error_message);
        body.errors = field_errors;
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            TokenError::Invalid => ApiError::Unauthorized("Invalid token".to_string()),
            TokenError::GenerationFailed(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NotAnImage | UploadError::TooLarge { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            UploadError::Io(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        ApiError::NotFound(format!("{resource} {id} not found"))
    }

    pub fn employee_not_found(id: i32) -> Self {
        Self::not_found("Employee", id)
    }

    pub fn config_not_found(key: &str) -> Self {
        ApiError::NotFound(format!("Config key '{key}' not found"))
    }

    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("Invalid credentials".to_string())
    }
}
