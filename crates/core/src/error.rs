//! Error taxonomy shared by every layer.
//!
//! Errors propagate as distinguishable values. The transport layer converts an
//! [`ErrorKind`] into a status code in exactly one place; nothing upstream
//! matches on error strings.

use thiserror::Error;

/// Result type used across the use-case layer.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The entity does not exist.
    #[error("not found")]
    NotFound,

    /// Duplicate registration.
    #[error("already exists")]
    AlreadyExists,

    /// Bad login. Never says whether the username or the password was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token is malformed or its signature does not match.
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    /// Token header asserts an algorithm other than the one this service issues.
    #[error("unexpected signing method")]
    UnexpectedSigningMethod,

    /// Authenticated but not permitted.
    #[error("access forbidden")]
    Forbidden,

    /// Structurally invalid payload.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Anything else. The detail is for server-side logs only.
    #[error("internal error")]
    Internal(String),
}

/// Fieldless discriminant of [`AppError`], used by the boundary mapping table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidCredentials,
    InvalidToken,
    TokenExpired,
    UnexpectedSigningMethod,
    Forbidden,
    Validation,
    Internal,
}

impl ErrorKind {
    /// Stable snake_case code for response bodies and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::InvalidCredentials => "invalid_credentials",
            ErrorKind::InvalidToken => "invalid_token",
            ErrorKind::TokenExpired => "token_expired",
            ErrorKind::UnexpectedSigningMethod => "unexpected_signing_method",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Validation => "validation_error",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound => ErrorKind::NotFound,
            AppError::AlreadyExists => ErrorKind::AlreadyExists,
            AppError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AppError::InvalidToken => ErrorKind::InvalidToken,
            AppError::TokenExpired => ErrorKind::TokenExpired,
            AppError::UnexpectedSigningMethod => ErrorKind::UnexpectedSigningMethod,
            AppError::Forbidden => ErrorKind::Forbidden,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Any of the authentication failures (bad login or bad token).
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidCredentials
                | ErrorKind::InvalidToken
                | ErrorKind::TokenExpired
                | ErrorKind::UnexpectedSigningMethod
        )
    }
}

/// Error returned by storage collaborators.
///
/// Only `NotFound` carries meaning across the boundary; every other failure is
/// opaque and becomes [`AppError::Internal`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A unique constraint was violated (e.g. a concurrent duplicate insert).
    #[error("record already exists")]
    Conflict,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => AppError::NotFound,
            StoreError::Conflict => AppError::AlreadyExists,
            StoreError::Unavailable(detail) => AppError::Internal(detail),
        }
    }
}
