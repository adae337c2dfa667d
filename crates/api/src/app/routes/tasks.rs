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
use taskforge_core::{TaskId, UserId};
use taskforge_projects::{CreateTask, DeleteTask, Task, TaskFilter, UpdateTask};

use crate::app::errors::ApiError;
use crate::app::routes::{decode_command, parse_id, query_filter};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tasks).post(create_task).put(update_task))
        .route("/:id", get(get_task).delete(delete_task))
}

/// `GET /tasks?employee_id=&project_id=&is_completed=`
pub async fn list_tasks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    query: Result<Query<TaskFilter>, QueryRejection>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let filter = query_filter(query)?;
    Ok(Json(services.projects.list_tasks(&identity, filter).await?))
}

pub async fn get_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id: TaskId = parse_id(&id)?;
    Ok(Json(services.projects.get_task(&identity, id).await?))
}

pub async fn create_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let cmd: CreateTask = decode_command(&identity, Action::create(Resource::Task), &body)?;
    let task = services.projects.create_task(&identity, cmd).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<Task>, ApiError> {
    let cmd: UpdateTask = decode_command(&identity, Action::update(Resource::Task), &body)?;
    Ok(Json(services.projects.update_task(&identity, cmd).await?))
}

pub async fn delete_task(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: TaskId = parse_id(&id)?;
    services
        .projects
        .delete_task(&identity, DeleteTask { id })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /employees/:id/tasks`
pub async fn tasks_for_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let employee: UserId = parse_id(&id)?;
    Ok(Json(
        services
            .projects
            .tasks_for_employee(&identity, employee)
            .await?,
    ))
}
