use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog::CatalogError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API Error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The message is for logs only; clients see a generic one.
    #[error("Internal Server Error")]
    Internal(String),

    /// The request body could not be parsed as JSON.
    #[error("Invalid JSON payload")]
    InvalidJson(String),
}

/// Error body sent to clients
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub message: String,
    /// Only present outside production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Attached to every error response so the response hook can log the
/// underlying cause and, in development, expose it.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub status: StatusCode,
    pub message: String,
    pub details: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("Authentication required".to_string())
    }

    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What went wrong, including causes hidden from the client message.
    pub fn details(&self) -> String {
        match self {
            ApiError::Internal(details) | ApiError::InvalidJson(details) => details.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = ErrorDetail {
            status,
            message: self.to_string(),
            details: self.details(),
        };
        let body = ApiErrorResponse {
            success: false,
            message: detail.message.clone(),
            details: None,
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(detail);
        response
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(errors) => {
                ApiError::BadRequest(errors.first().unwrap_or("Invalid request").to_string())
            }
            CatalogError::NotFound(message) => ApiError::NotFound(message),
            CatalogError::Unauthenticated(message) => ApiError::Unauthorized(message),
            CatalogError::Forbidden(message) => ApiError::Forbidden(message),
            CatalogError::Conflict(message) => ApiError::Conflict(message),
            CatalogError::Unexpected(message) => ApiError::Internal(message),
        }
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        ApiError::Internal(format!("Session error: {}", err))
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
