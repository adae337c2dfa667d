use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::dto::{LoginRequest, RegisterRequest, TokenResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = body.into_command()?;
    let token = services.accounts.register(cmd).await?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = services
        .accounts
        .login(body.username.trim(), &body.password)
        .await?;
    Ok(Json(TokenResponse { token }))
}
