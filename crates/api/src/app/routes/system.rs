use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use taskforge_auth::Identity;

use crate::context::RequestId;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(identity): Extension<Identity>,
    Extension(request_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": identity.user_id,
        "role": identity.role,
        "request_id": request_id.to_string(),
    }))
}
