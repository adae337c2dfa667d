use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use taskforge_auth::{Action, Identity, Resource};
use taskforge_core::ProjectId;
use taskforge_projects::{CreateProject, DeleteProject, Project, UpdateProject};

use crate::app::errors::ApiError;
use crate::app::routes::{decode_command, parse_id};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_projects).post(create_project).put(update_project),
        )
        .route("/:id", get(get_project).delete(delete_project))
}

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(services.projects.list_projects(&identity).await?))
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let id: ProjectId = parse_id(&id)?;
    Ok(Json(services.projects.get_project(&identity, id).await?))
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let cmd: CreateProject = decode_command(&identity, Action::create(Resource::Project), &body)?;
    let project = services.projects.create_project(&identity, cmd).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<Project>, ApiError> {
    let cmd: UpdateProject = decode_command(&identity, Action::update(Resource::Project), &body)?;
    Ok(Json(services.projects.update_project(&identity, cmd).await?))
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: ProjectId = parse_id(&id)?;
    services
        .projects
        .delete_project(&identity, DeleteProject { id })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
