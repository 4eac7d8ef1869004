//! Unified error handling
//!
//! Application error type and its HTTP mapping:
//! - [`AppError`] - application error enum
//! - error body: `{ "error": <code>, "message": <text>, "details"?: ... }`
//!
//! Wire codes come from [`shared::error::ErrorCode`]; handlers construct
//! errors through the helper constructors and never touch status codes
//! directly.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::error::ErrorCode;
use tracing::error;

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication errors (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    TokenInvalid(String),

    /// Refresh-chain specific: unknown, revoked or expired refresh secret
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Unified login failure; never reveals which half was wrong
    #[error("Invalid email or password")]
    InvalidCredentials,

    // ========== Authorization errors (403) ==========
    #[error("Forbidden: {0}")]
    Forbidden(String),

    // ========== Business errors (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    // ========== System errors (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl AppError {
    fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Unauthorized | AppError::TokenInvalid(_) | AppError::InvalidCredentials => {
                ErrorCode::Unauthorized
            }
            AppError::InvalidRefreshToken => ErrorCode::InvalidToken,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Validation(_) => ErrorCode::Validation,
            AppError::Invalid(_) => ErrorCode::BadRequest,
            AppError::Database(_) => ErrorCode::Database,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let status = code.status_code();

        // Internal detail stays server-side; the wire gets the generic message
        let message = match &self {
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                code.default_message().to_string()
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                code.default_message().to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorBody {
            error: code.code(),
            message,
            details: None,
        });

        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::TokenInvalid(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Unified message to prevent account enumeration during login
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<crate::db::repository::RepoError> for AppError {
    fn from(e: crate::db::repository::RepoError) -> Self {
        use crate::db::repository::RepoError;
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Result alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn refresh_errors_map_to_invalid_token_code() {
        assert_eq!(AppError::InvalidRefreshToken.error_code(), ErrorCode::InvalidToken);
        assert_eq!(
            AppError::InvalidRefreshToken.error_code().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn conflict_is_distinct_from_validation() {
        assert_ne!(
            AppError::conflict("stock").error_code().status_code(),
            AppError::validation("totals").error_code().status_code()
        );
    }
}
