//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! Unknown account and wrong password both map to `InvalidCredential` so the
//! API boundary cannot be used for account enumeration.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown account (not distinguished on purpose)
    #[error("Invalid credential")]
    InvalidCredential,

    /// Email already registered
    #[error("Email has been used")]
    DuplicateEmail,

    /// Username already registered
    #[error("Username has been used")]
    DuplicateUsername,

    /// Token signature invalid or token malformed
    #[error("Token is invalid")]
    TokenInvalid,

    /// Token signature valid but past expiry
    #[error("Token has expired")]
    TokenExpired,

    /// No session matches the presented token or id
    #[error("Session not found")]
    SessionNotFound,

    /// Lost a refresh rotation race; the token was already rotated
    #[error("Session was rotated concurrently")]
    RotationConflict,

    /// Principal does not exist
    #[error("User not found")]
    UserNotFound,

    /// Missing or invalid access proof
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but insufficient role or wrong subject
    #[error("Forbidden")]
    Forbidden,

    /// Request validation error
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Persistence backend did not answer within the request deadline
    #[error("Operation timed out")]
    Timeout,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredential => StatusCode::UNAUTHORIZED,
            AuthError::DuplicateEmail | AuthError::DuplicateUsername => StatusCode::CONFLICT,
            AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::SessionNotFound
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::RotationConflict => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredential
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::SessionNotFound
            | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::DuplicateEmail
            | AuthError::DuplicateUsername
            | AuthError::RotationConflict => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Timeout => ErrorKind::RequestTimeout,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    ///
    /// Which authorization check failed is server-side detail only; the
    /// response body never carries more than the 401/403 distinction.
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Timeout => {
                tracing::error!("Auth persistence operation timed out");
            }
            AuthError::InvalidCredential => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RotationConflict => {
                tracing::warn!("Concurrent refresh lost the rotation race");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AuthError::TokenInvalid,
            TokenError::Expired => AuthError::TokenExpired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::InvalidCredential.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::DuplicateUsername.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::RotationConflict.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::Timeout.status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
    }

    #[test]
    fn test_token_error_conversion() {
        assert!(matches!(
            AuthError::from(TokenError::Invalid),
            AuthError::TokenInvalid
        ));
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::TokenExpired
        ));
    }

    #[test]
    fn test_unauthorized_and_forbidden_stay_distinct() {
        assert_eq!(AuthError::Unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::Forbidden.kind(), ErrorKind::Forbidden);
    }
}
