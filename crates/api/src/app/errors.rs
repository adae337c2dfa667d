use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use taskforge_core::{AppError, ErrorKind};

/// Use-case error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// The single error → status table.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::InvalidCredentials
        | ErrorKind::InvalidToken
        | ErrorKind::TokenExpired
        | ErrorKind::UnexpectedSigningMethod => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let kind = self.0.kind();
        if let AppError::Internal(detail) = &self.0 {
            tracing::error!(%detail, "request failed");
        }
        // Display never includes internal detail.
        json_error(status_for(kind), kind.code(), self.0.to_string())
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
