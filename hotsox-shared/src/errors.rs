use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: User and profile picture errors
/// - E3xxx: Sock errors
/// - E4xxx: Swipe and match errors
/// - E5xxx: Chat errors
/// - E6xxx: Mail errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    PayloadTooLarge,
    Conflict,

    // Auth (E1xxx)
    InvalidCredentials,
    UsernameTaken,
    EmailAlreadyExists,
    TokenExpired,
    TokenInvalid,
    RefreshTokenRevoked,
    PasswordTooWeak,
    InvalidUsername,
    UnderAge,
    AccountInactive,

    // User (E2xxx)
    UserNotFound,
    PictureNotFound,
    PictureUploadFailed,
    UnsupportedImageFormat,

    // Sock (E3xxx)
    SockNotFound,
    NotSockOwner,
    NoSockSelected,

    // Swipe / match (E4xxx)
    CannotSwipeOwnSock,
    AlreadySwiped,
    MatchNotFound,
    AlreadyUnmatched,

    // Chat (E5xxx)
    NotMatched,
    EmptyMessage,

    // Mail (E6xxx)
    MailNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::RateLimited => "E0006",
            Self::PayloadTooLarge => "E0009",
            Self::Conflict => "E0010",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::UsernameTaken => "E1002",
            Self::EmailAlreadyExists => "E1003",
            Self::TokenExpired => "E1004",
            Self::TokenInvalid => "E1005",
            Self::RefreshTokenRevoked => "E1006",
            Self::PasswordTooWeak => "E1007",
            Self::InvalidUsername => "E1008",
            Self::UnderAge => "E1009",
            Self::AccountInactive => "E1010",

            // User
            Self::UserNotFound => "E2001",
            Self::PictureNotFound => "E2002",
            Self::PictureUploadFailed => "E2003",
            Self::UnsupportedImageFormat => "E2004",

            // Sock
            Self::SockNotFound => "E3001",
            Self::NotSockOwner => "E3002",
            Self::NoSockSelected => "E3003",

            // Swipe / match
            Self::CannotSwipeOwnSock => "E4001",
            Self::AlreadySwiped => "E4002",
            Self::MatchNotFound => "E4003",
            Self::AlreadyUnmatched => "E4004",

            // Chat
            Self::NotMatched => "E5001",
            Self::EmptyMessage => "E5002",

            // Mail
            Self::MailNotFound => "E6001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::PasswordTooWeak
            | Self::InvalidUsername | Self::UnderAge | Self::EmptyMessage
            | Self::NoSockSelected | Self::CannotSwipeOwnSock => StatusCode::BAD_REQUEST,
            Self::PictureUploadFailed | Self::UnsupportedImageFormat => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound | Self::UserNotFound | Self::PictureNotFound | Self::SockNotFound
            | Self::MatchNotFound | Self::MailNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired
            | Self::TokenInvalid | Self::RefreshTokenRevoked => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotSockOwner | Self::NotMatched
            | Self::AccountInactive => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Conflict | Self::UsernameTaken | Self::EmailAlreadyExists
            | Self::AlreadySwiped | Self::AlreadyUnmatched => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known { code: ErrorCode, message: String },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Error code this error renders with; `None` for raw infrastructure errors.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            AppError::Known { code, .. } => Some(*code),
            AppError::Validation(_) => Some(ErrorCode::ValidationError),
            AppError::Database(diesel::result::Error::NotFound) => Some(ErrorCode::NotFound),
            AppError::Database(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => Some(ErrorCode::Conflict),
            AppError::Internal(_) | AppError::Database(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message } => {
                (code.status_code(), ApiErrorResponse::new(code.code(), message))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => match err {
                diesel::result::Error::NotFound => (
                    StatusCode::NOT_FOUND,
                    ApiErrorResponse::new("E0003", "resource not found"),
                ),
                diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                    tracing::warn!(constraint = ?info.constraint_name(), "unique violation");
                    (
                        StatusCode::CONFLICT,
                        ApiErrorResponse::new("E0010", "resource already exists"),
                    )
                }
                _ => {
                    tracing::error!(error = %err, "database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    )
                }
            },
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let all = [
            ErrorCode::InternalError,
            ErrorCode::ValidationError,
            ErrorCode::NotFound,
            ErrorCode::Unauthorized,
            ErrorCode::Forbidden,
            ErrorCode::RateLimited,
            ErrorCode::PayloadTooLarge,
            ErrorCode::Conflict,
            ErrorCode::InvalidCredentials,
            ErrorCode::UsernameTaken,
            ErrorCode::EmailAlreadyExists,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::RefreshTokenRevoked,
            ErrorCode::PasswordTooWeak,
            ErrorCode::InvalidUsername,
            ErrorCode::UnderAge,
            ErrorCode::AccountInactive,
            ErrorCode::UserNotFound,
            ErrorCode::PictureNotFound,
            ErrorCode::PictureUploadFailed,
            ErrorCode::UnsupportedImageFormat,
            ErrorCode::SockNotFound,
            ErrorCode::NotSockOwner,
            ErrorCode::NoSockSelected,
            ErrorCode::CannotSwipeOwnSock,
            ErrorCode::AlreadySwiped,
            ErrorCode::MatchNotFound,
            ErrorCode::AlreadyUnmatched,
            ErrorCode::NotMatched,
            ErrorCode::EmptyMessage,
            ErrorCode::MailNotFound,
        ];
        let mut seen = std::collections::HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn ownership_and_match_errors_are_client_errors() {
        assert_eq!(ErrorCode::NotSockOwner.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotMatched.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::AlreadyUnmatched.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::MatchNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::UnderAge.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn known_error_renders_its_status() {
        let resp = AppError::new(ErrorCode::SockNotFound, "sock not found").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AppError::Database(diesel::result::Error::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AppError::Validation("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_code_of_raw_errors() {
        assert_eq!(
            AppError::Database(diesel::result::Error::NotFound).error_code(),
            Some(ErrorCode::NotFound)
        );
        assert_eq!(AppError::internal("x").error_code(), Some(ErrorCode::InternalError));
        assert_eq!(AppError::Internal(anyhow::anyhow!("boom")).error_code(), None);
    }
}
