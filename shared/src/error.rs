//! Unified error codes
//!
//! Every error the API surfaces carries a stable machine-readable code plus
//! a human message. Codes map 1:1 to HTTP status; handlers never invent
//! ad-hoc status codes.

use http::StatusCode;

/// Standard API error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed or inconsistent input (400)
    BadRequest,
    /// Field-level validation failure (400)
    Validation,
    /// Missing, expired or invalid credential (401)
    Unauthorized,
    /// Refresh-chain specific: expired, revoked or unknown token (401)
    InvalidToken,
    /// Valid identity, insufficient role or ownership (403)
    Forbidden,
    /// Referenced entity absent (404)
    NotFound,
    /// Stock or uniqueness violation (409)
    Conflict,
    /// Anything unexpected (500); detail stays server-side
    InternalError,
    /// Database failure (500); detail stays server-side
    Database,
}

impl ErrorCode {
    /// HTTP status for this code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire code string; part of the API contract, never renamed
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::Validation => "BadRequest",
            Self::Unauthorized => "Unauthorized",
            Self::InvalidToken => "InvalidToken",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "NotFound",
            Self::Conflict => "Conflict",
            Self::InternalError => "InternalError",
            Self::Database => "InternalError",
        }
    }

    /// Default human message
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::Validation => "Validation failed",
            Self::Unauthorized => "Unauthorized",
            Self::InvalidToken => "Invalid refresh token",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Conflict",
            Self::InternalError => "Internal server error",
            Self::Database => "Internal server error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
