//! Domain models for projects, teams, members, and tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskforge_auth::{MemberAttributes, Role};
use taskforge_core::{Entity, ProjectId, TaskId, TeamId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub planned_end_date: DateTime<Utc>,
    pub actual_end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub priority: u32,
    /// Owning team; the authorization scope of the project.
    pub team_id: TeamId,
    pub budget: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl Member {
    pub fn attributes(&self) -> MemberAttributes {
        MemberAttributes {
            name: self.name.clone(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub members: Vec<Member>,
    pub manager_id: UserId,
}

impl Team {
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub employee_id: UserId,
    pub project_id: ProjectId,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MemberFilter {
    pub role: Option<Role>,
    pub team_id: Option<TeamId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskFilter {
    pub employee_id: Option<UserId>,
    pub project_id: Option<ProjectId>,
    pub is_completed: Option<bool>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.employee_id.is_none_or(|id| task.employee_id == id)
            && self.project_id.is_none_or(|id| task.project_id == id)
            && self.is_completed.is_none_or(|done| task.is_completed == done)
    }
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> ProjectId {
        self.id
    }

    fn with_id(self, id: ProjectId) -> Self {
        Self { id, ..self }
    }
}

impl Entity for Team {
    type Id = TeamId;

    fn id(&self) -> TeamId {
        self.id
    }

    fn with_id(self, id: TeamId) -> Self {
        Self { id, ..self }
    }
}

impl Entity for Task {
    type Id = TaskId;

    fn id(&self) -> TaskId {
        self.id
    }

    fn with_id(self, id: TaskId) -> Self {
        Self { id, ..self }
    }
}
