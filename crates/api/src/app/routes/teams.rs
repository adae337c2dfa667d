use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, Path, Query, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use taskforge_auth::{Action, Identity, Resource};
use taskforge_core::TeamId;
use taskforge_projects::{CreateTeam, DeleteTeam, Member, MemberFilter, Team, UpdateTeam};

use crate::app::errors::ApiError;
use crate::app::routes::{decode_command, parse_id, query_filter};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_teams).post(create_team).put(update_team))
        .route("/:id", get(get_team).delete(delete_team))
}

pub async fn list_teams(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Team>>, ApiError> {
    Ok(Json(services.projects.list_teams(&identity).await?))
}

pub async fn get_team(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Team>, ApiError> {
    let id: TeamId = parse_id(&id)?;
    Ok(Json(services.projects.get_team(&identity, id).await?))
}

pub async fn create_team(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let cmd: CreateTeam = decode_command(&identity, Action::create(Resource::Team), &body)?;
    let team = services.projects.create_team(&identity, cmd).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn update_team(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<Team>, ApiError> {
    let cmd: UpdateTeam = decode_command(&identity, Action::update(Resource::Team), &body)?;
    Ok(Json(services.projects.update_team(&identity, cmd).await?))
}

pub async fn delete_team(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: TeamId = parse_id(&id)?;
    services
        .projects
        .delete_team(&identity, DeleteTeam { id })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /members?role=&team_id=`
pub async fn list_members(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    query: Result<Query<MemberFilter>, QueryRejection>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let filter = query_filter(query)?;
    Ok(Json(services.projects.list_members(&identity, filter).await?))
}
