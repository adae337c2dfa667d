use axum::{
    Router,
    extract::{Query, rejection::QueryRejection},
    routing::get,
    routing::post,
};
use serde::de::DeserializeOwned;

use taskforge_auth::{Action, Identity, Scope, authorize};
use taskforge_core::AppError;

use crate::app::errors::ApiError;

pub mod auth;
pub mod projects;
pub mod system;
pub mod tasks;
pub mod teams;

/// Router for endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/users/register", post(auth::register))
        .route("/users/login", post(auth::login))
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/projects", projects::router())
        .nest("/teams", teams::router())
        .route("/members", get(teams::list_members))
        .nest("/tasks", tasks::router())
        .route("/employees/:id/tasks", get(tasks::tasks_for_employee))
}

/// Parse a path id, answering 400 on garbage.
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: core::str::FromStr<Err = AppError>,
{
    raw.parse::<T>().map_err(Into::into)
}

/// Role check for a mutation, then decode its JSON body.
///
/// Callers without the role get `Forbidden` whatever the body holds; a body
/// that does not decode is a `Validation` error.
pub(crate) fn decode_command<C>(identity: &Identity, action: Action, body: &[u8]) -> Result<C, ApiError>
where
    C: DeserializeOwned,
{
    authorize(identity, action, Scope::Unscoped).map_err(AppError::from)?;
    serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("invalid request body: {e}")).into())
}

/// Unwrap a query filter, turning a rejected query string into `Validation`.
pub(crate) fn query_filter<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    match query {
        Ok(Query(filter)) => Ok(filter),
        Err(rejection) => Err(AppError::validation(rejection.body_text()).into()),
    }
}
