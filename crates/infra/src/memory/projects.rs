use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

use taskforge_core::{Entity, ProjectId, StoreError, TaskId, TeamId, UserId};
use taskforge_projects::{
    Member, MemberFilter, Project, ProjectStore, Task, TaskFilter, Team, TeamMembership,
};

use super::poisoned;

/// Rows keyed by id, plus the last id handed out.
#[derive(Debug)]
struct Table<T: Entity> {
    rows: BTreeMap<T::Id, T>,
    last_id: u32,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T>
where
    T: Entity + Clone,
    T::Id: Ord + From<u32>,
{
    fn insert(&mut self, row: T) -> T::Id {
        self.last_id += 1;
        let id = T::Id::from(self.last_id);
        self.rows.insert(id, row.with_id(id));
        id
    }

    fn replace(&mut self, row: T) -> Result<(), StoreError> {
        let slot = self.rows.get_mut(&row.id()).ok_or(StoreError::NotFound)?;
        *slot = row;
        Ok(())
    }

    fn remove(&mut self, id: T::Id) -> Result<T, StoreError> {
        self.rows.remove(&id).ok_or(StoreError::NotFound)
    }

    fn get(&self, id: T::Id) -> Result<T, StoreError> {
        self.rows.get(&id).cloned().ok_or(StoreError::NotFound)
    }
}

#[derive(Debug, Default)]
struct Tables {
    projects: Table<Project>,
    teams: Table<Team>,
    tasks: Table<Task>,
}

/// Project, team, and task storage.
///
/// Listings are ordered by id. Deleting a project deletes its tasks.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    inner: RwLock<Tables>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn create_project(&self, project: Project) -> Result<ProjectId, StoreError> {
        Ok(self.inner.write().map_err(poisoned)?.projects.insert(project))
    }

    async fn update_project(&self, project: Project) -> Result<(), StoreError> {
        self.inner.write().map_err(poisoned)?.projects.replace(project)
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        tables.projects.remove(id)?;
        tables.tasks.rows.retain(|_, task| task.project_id != id);
        Ok(())
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, StoreError> {
        self.inner.read().map_err(poisoned)?.projects.get(id)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let tables = self.inner.read().map_err(poisoned)?;
        Ok(tables.projects.rows.values().cloned().collect())
    }

    async fn create_team(&self, team: Team) -> Result<TeamId, StoreError> {
        Ok(self.inner.write().map_err(poisoned)?.teams.insert(team))
    }

    async fn update_team(&self, team: Team) -> Result<(), StoreError> {
        self.inner.write().map_err(poisoned)?.teams.replace(team)
    }

    async fn delete_team(&self, id: TeamId) -> Result<(), StoreError> {
        self.inner.write().map_err(poisoned)?.teams.remove(id)?;
        Ok(())
    }

    async fn get_team(&self, id: TeamId) -> Result<Team, StoreError> {
        self.inner.read().map_err(poisoned)?.teams.get(id)
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        let tables = self.inner.read().map_err(poisoned)?;
        Ok(tables.teams.rows.values().cloned().collect())
    }

    async fn list_members(&self, filter: &MemberFilter) -> Result<Vec<Member>, StoreError> {
        let tables = self.inner.read().map_err(poisoned)?;
        let mut seen = HashSet::new();

        Ok(tables
            .teams
            .rows
            .values()
            .filter(|team| filter.team_id.is_none_or(|id| team.id == id))
            .flat_map(|team| team.members.iter())
            .filter(|member| filter.role.is_none_or(|role| member.role == role))
            .filter(|member| seen.insert(member.id))
            .cloned()
            .collect())
    }

    async fn create_task(&self, task: Task) -> Result<TaskId, StoreError> {
        Ok(self.inner.write().map_err(poisoned)?.tasks.insert(task))
    }

    async fn update_task(&self, task: Task) -> Result<(), StoreError> {
        self.inner.write().map_err(poisoned)?.tasks.replace(task)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        self.inner.write().map_err(poisoned)?.tasks.remove(id)?;
        Ok(())
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, StoreError> {
        self.inner.read().map_err(poisoned)?.tasks.get(id)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let tables = self.inner.read().map_err(poisoned)?;
        Ok(tables
            .tasks
            .rows
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl TeamMembership for InMemoryProjectStore {
    /// The lowest-id team listing the user.
    async fn team_id_for_user(&self, user_id: UserId) -> Result<TeamId, StoreError> {
        let tables = self.inner.read().map_err(poisoned)?;
        tables
            .teams
            .rows
            .values()
            .find(|team| team.has_member(user_id))
            .map(|team| team.id)
            .ok_or(StoreError::NotFound)
    }
}
