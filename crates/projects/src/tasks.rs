//! Task use-cases.

use std::collections::HashSet;

use serde::Deserialize;

use taskforge_auth::{Action, CommandAuthorization, Identity, Resource, Scope, authorize};
use taskforge_core::{AppError, AppResult, ProjectId, TaskId, UserId};

use crate::model::{Task, TaskFilter};
use crate::service::{ProjectService, reference_err, store_err};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTask {
    pub description: String,
    pub employee_id: UserId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateTask {
    pub id: TaskId,
    pub description: String,
    pub employee_id: UserId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeleteTask {
    pub id: TaskId,
}

impl CommandAuthorization for CreateTask {
    fn required_action(&self) -> Action {
        Action::create(Resource::Task)
    }
}

impl CommandAuthorization for UpdateTask {
    fn required_action(&self) -> Action {
        Action::update(Resource::Task)
    }
}

impl CommandAuthorization for DeleteTask {
    fn required_action(&self) -> Action {
        Action::delete(Resource::Task)
    }
}

fn validate_description(description: &str) -> AppResult<()> {
    if description.trim().is_empty() {
        return Err(AppError::validation("task description must not be empty"));
    }
    Ok(())
}

impl CreateTask {
    pub fn validate(&self) -> AppResult<()> {
        validate_description(&self.description)
    }
}

impl UpdateTask {
    pub fn validate(&self) -> AppResult<()> {
        validate_description(&self.description)
    }
}

impl ProjectService {
    /// A single task. Members may read tasks of projects owned by their team.
    pub async fn get_task(&self, identity: &Identity, id: TaskId) -> AppResult<Task> {
        self.guard_action(identity, Action::read(Resource::Task))?;

        let task = self
            .store
            .get_task(id)
            .await
            .map_err(store_err("failed to get task"))?;

        if !identity.is_admin() {
            let project = self
                .store
                .get_project(task.project_id)
                .await
                .map_err(store_err("failed to get project of task"))?;
            self.authorize_read(identity, Resource::Task, project.team_id)
                .await?;
        }

        self.audit(identity, &format!("Fetching task (id: {id})"));
        Ok(task)
    }

    /// Tasks matching `filter`. Members only see tasks of their team's projects.
    pub async fn list_tasks(&self, identity: &Identity, filter: TaskFilter) -> AppResult<Vec<Task>> {
        self.guard_action(identity, Action::read(Resource::Task))?;

        let visible_projects = if identity.is_admin() {
            None
        } else {
            let Some(team) = self.caller_team(identity).await? else {
                return Ok(Vec::new());
            };
            let projects = self
                .store
                .list_projects()
                .await
                .map_err(store_err("failed to list projects"))?;
            Some(
                projects
                    .into_iter()
                    .filter(|p| p.team_id == team)
                    .map(|p| p.id)
                    .collect::<HashSet<_>>(),
            )
        };

        let mut tasks = self
            .store
            .list_tasks(&filter)
            .await
            .map_err(store_err("failed to list tasks"))?;
        if let Some(visible) = visible_projects {
            tasks.retain(|t| visible.contains(&t.project_id));
        }

        self.audit(identity, "Fetching tasks");
        Ok(tasks)
    }

    /// Tasks assigned to `employee_id`. Members may only ask for their own.
    pub async fn tasks_for_employee(
        &self,
        identity: &Identity,
        employee_id: UserId,
    ) -> AppResult<Vec<Task>> {
        authorize(identity, Action::read(Resource::Task), Scope::Owner(employee_id))?;

        let filter = TaskFilter {
            employee_id: Some(employee_id),
            ..TaskFilter::default()
        };
        let tasks = self
            .store
            .list_tasks(&filter)
            .await
            .map_err(store_err("failed to get tasks for employee"))?;

        self.audit(
            identity,
            &format!("Fetching tasks by employee id (id: {employee_id})"),
        );
        Ok(tasks)
    }

    pub async fn create_task(&self, identity: &Identity, cmd: CreateTask) -> AppResult<Task> {
        self.guard(identity, &cmd)?;
        cmd.validate()?;
        self.check_task_references(cmd.project_id, cmd.employee_id)
            .await?;

        let task = Task {
            id: TaskId::new(0),
            description: cmd.description,
            employee_id: cmd.employee_id,
            project_id: cmd.project_id,
            is_completed: cmd.is_completed,
        };
        let id = self
            .store
            .create_task(task.clone())
            .await
            .map_err(store_err("failed to create task"))?;

        self.audit(identity, &format!("Creating new task (id: {id})"));
        Ok(Task { id, ..task })
    }

    pub async fn update_task(&self, identity: &Identity, cmd: UpdateTask) -> AppResult<Task> {
        self.guard(identity, &cmd)?;
        cmd.validate()?;

        self.store
            .get_task(cmd.id)
            .await
            .map_err(store_err("failed to get task"))?;
        self.check_task_references(cmd.project_id, cmd.employee_id)
            .await?;

        let task = Task {
            id: cmd.id,
            description: cmd.description,
            employee_id: cmd.employee_id,
            project_id: cmd.project_id,
            is_completed: cmd.is_completed,
        };
        self.store
            .update_task(task.clone())
            .await
            .map_err(store_err("failed to update task"))?;

        self.audit(identity, &format!("Updating task (id: {})", task.id));
        Ok(task)
    }

    pub async fn delete_task(&self, identity: &Identity, cmd: DeleteTask) -> AppResult<()> {
        self.guard(identity, &cmd)?;

        self.store
            .delete_task(cmd.id)
            .await
            .map_err(store_err("failed to delete task"))?;

        self.audit(identity, &format!("Deleting task (id: {})", cmd.id));
        Ok(())
    }

    async fn check_task_references(&self, project: ProjectId, employee: UserId) -> AppResult<()> {
        self.store
            .get_project(project)
            .await
            .map_err(reference_err("project"))?;
        self.members
            .member_by_id(employee)
            .await
            .map_err(reference_err("employee"))?;
        Ok(())
    }
}
