use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use taskforge_auth::TokenVerifier;
use taskforge_core::AppError;

use crate::app::errors::{ApiError, json_error};
use crate::context::RequestId;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
}

/// Resolve the bearer token into an [`Identity`](taskforge_auth::Identity)
/// request extension, or answer 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return json_error(
            StatusCode::UNAUTHORIZED,
            "missing_token",
            "missing bearer token",
        );
    };

    let identity = match state.verifier.verify(token) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(reason = %e, "token rejected");
            return ApiError::from(AppError::from(e)).into_response();
        }
    };

    tracing::Span::current().record("user_id", tracing::field::display(identity.user_id));
    req.extensions_mut().insert(identity);

    next.run(req).await
}

/// Wrap each request in a span carrying a fresh request id.
pub async fn request_span(mut req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let request_id = RequestId::new();
    req.extensions_mut().insert(request_id);

    let span = tracing::info_span!(
        "http_request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path(),
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;
        tracing::info!(status = response.status().as_u16(), "request completed");
        response
    }
    .instrument(span)
    .await
}

/// `Authorization: Bearer <token>`, prefix case-sensitive, token trimmed.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token)
}
