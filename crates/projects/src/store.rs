//! Storage collaborators consumed by the use-cases.
//!
//! Implementations live in `taskforge-infra`. Absence is always reported as
//! `StoreError::NotFound`; every other failure is opaque.

use taskforge_auth::MemberAttributes;
use taskforge_core::{ProjectId, StoreError, TaskId, TeamId, UserId};

use crate::model::{Member, MemberFilter, Project, Task, TaskFilter, Team};

#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    /// Persist a new project; the id on `project` is ignored and a fresh one returned.
    async fn create_project(&self, project: Project) -> Result<ProjectId, StoreError>;
    async fn update_project(&self, project: Project) -> Result<(), StoreError>;
    async fn delete_project(&self, id: ProjectId) -> Result<(), StoreError>;
    async fn get_project(&self, id: ProjectId) -> Result<Project, StoreError>;
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    async fn create_team(&self, team: Team) -> Result<TeamId, StoreError>;
    async fn update_team(&self, team: Team) -> Result<(), StoreError>;
    async fn delete_team(&self, id: TeamId) -> Result<(), StoreError>;
    async fn get_team(&self, id: TeamId) -> Result<Team, StoreError>;
    async fn list_teams(&self) -> Result<Vec<Team>, StoreError>;
    async fn list_members(&self, filter: &MemberFilter) -> Result<Vec<Member>, StoreError>;

    async fn create_task(&self, task: Task) -> Result<TaskId, StoreError>;
    async fn update_task(&self, task: Task) -> Result<(), StoreError>;
    async fn delete_task(&self, id: TaskId) -> Result<(), StoreError>;
    async fn get_task(&self, id: TaskId) -> Result<Task, StoreError>;
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;
}

/// Resolves the team a user currently belongs to.
///
/// Called on every scoped read so that a team reassignment takes effect
/// without re-login.
#[async_trait::async_trait]
pub trait TeamMembership: Send + Sync {
    async fn team_id_for_user(&self, user_id: UserId) -> Result<TeamId, StoreError>;
}

/// Looks up the stored attributes of a prospective team member.
#[async_trait::async_trait]
pub trait MemberLookup: Send + Sync {
    async fn member_by_id(&self, id: UserId) -> Result<MemberAttributes, StoreError>;
}
