use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use taskforge_auth::{Identity, MemberAttributes, Role};
use taskforge_core::{Entity, ProjectId, StoreError, TaskId, TeamId, UserId};
use taskforge_observability::AuditLog;

use crate::model::{Member, MemberFilter, Project, Task, TaskFilter, Team};
use crate::service::ProjectService;
use crate::store::{MemberLookup, ProjectStore, TeamMembership};

#[derive(Default)]
struct State {
    projects: BTreeMap<ProjectId, Project>,
    teams: BTreeMap<TeamId, Team>,
    tasks: BTreeMap<TaskId, Task>,
    users: BTreeMap<UserId, MemberAttributes>,
    next_id: u32,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Map-backed store that counts every call it receives.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<State>,
    calls: AtomicUsize,
    lookups_broken: AtomicBool,
}

impl FakeStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make team membership and member lookups fail as if the backend were down.
    pub fn break_lookups(&self) {
        self.lookups_broken.store(true, Ordering::SeqCst);
    }

    fn lookup_failure(&self) -> Result<(), StoreError> {
        if self.lookups_broken.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("connection reset by peer"));
        }
        Ok(())
    }

    fn touch(&self) -> std::sync::MutexGuard<'_, State> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap()
    }

    pub fn add_user(&self, id: u32, name: &str, role: Role) -> Member {
        let member = Member {
            id: UserId::new(id),
            name: name.to_string(),
            role,
        };
        self.state
            .lock()
            .unwrap()
            .users
            .insert(member.id, member.attributes());
        member
    }

    pub fn seed_team(&self, id: u32, members: Vec<Member>) -> TeamId {
        let team = Team {
            id: TeamId::new(id),
            name: format!("team-{id}"),
            manager_id: members.first().map(|m| m.id).unwrap_or(UserId::new(1)),
            members,
        };
        self.state.lock().unwrap().teams.insert(team.id, team.clone());
        team.id
    }

    pub fn seed_project(&self, id: u32, team: TeamId) -> ProjectId {
        let project = sample_project(team).with_id(ProjectId::new(id));
        self.state
            .lock()
            .unwrap()
            .projects
            .insert(project.id, project.clone());
        project.id
    }

    pub fn seed_task(&self, id: u32, project: ProjectId, employee: UserId) -> TaskId {
        let task = Task {
            id: TaskId::new(id),
            description: format!("task-{id}"),
            employee_id: employee,
            project_id: project,
            is_completed: false,
        };
        self.state.lock().unwrap().tasks.insert(task.id, task.clone());
        task.id
    }
}

#[async_trait::async_trait]
impl ProjectStore for FakeStore {
    async fn create_project(&self, project: Project) -> Result<ProjectId, StoreError> {
        let mut state = self.touch();
        let id = ProjectId::new(state.next_id());
        state.projects.insert(id, project.with_id(id));
        Ok(id)
    }

    async fn update_project(&self, project: Project) -> Result<(), StoreError> {
        let mut state = self.touch();
        let slot = state.projects.get_mut(&project.id).ok_or(StoreError::NotFound)?;
        *slot = project;
        Ok(())
    }

    async fn delete_project(&self, id: ProjectId) -> Result<(), StoreError> {
        self.touch().projects.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, StoreError> {
        self.touch().projects.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.touch().projects.values().cloned().collect())
    }

    async fn create_team(&self, team: Team) -> Result<TeamId, StoreError> {
        let mut state = self.touch();
        let id = TeamId::new(state.next_id());
        state.teams.insert(id, team.with_id(id));
        Ok(id)
    }

    async fn update_team(&self, team: Team) -> Result<(), StoreError> {
        let mut state = self.touch();
        let slot = state.teams.get_mut(&team.id).ok_or(StoreError::NotFound)?;
        *slot = team;
        Ok(())
    }

    async fn delete_team(&self, id: TeamId) -> Result<(), StoreError> {
        self.touch().teams.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn get_team(&self, id: TeamId) -> Result<Team, StoreError> {
        self.touch().teams.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        Ok(self.touch().teams.values().cloned().collect())
    }

    async fn list_members(&self, filter: &MemberFilter) -> Result<Vec<Member>, StoreError> {
        let state = self.touch();
        Ok(state
            .teams
            .values()
            .filter(|t| filter.team_id.is_none_or(|id| t.id == id))
            .flat_map(|t| t.members.iter().cloned())
            .filter(|m| filter.role.is_none_or(|role| m.role == role))
            .collect())
    }

    async fn create_task(&self, task: Task) -> Result<TaskId, StoreError> {
        let mut state = self.touch();
        let id = TaskId::new(state.next_id());
        state.tasks.insert(id, task.with_id(id));
        Ok(id)
    }

    async fn update_task(&self, task: Task) -> Result<(), StoreError> {
        let mut state = self.touch();
        let slot = state.tasks.get_mut(&task.id).ok_or(StoreError::NotFound)?;
        *slot = task;
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        self.touch().tasks.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, StoreError> {
        self.touch().tasks.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .touch()
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl TeamMembership for FakeStore {
    async fn team_id_for_user(&self, user_id: UserId) -> Result<TeamId, StoreError> {
        self.lookup_failure()?;
        self.touch()
            .teams
            .values()
            .find(|t| t.has_member(user_id))
            .map(|t| t.id)
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait::async_trait]
impl MemberLookup for FakeStore {
    async fn member_by_id(&self, id: UserId) -> Result<MemberAttributes, StoreError> {
        self.lookup_failure()?;
        self.touch().users.get(&id).cloned().ok_or(StoreError::NotFound)
    }
}

#[derive(Clone, Default)]
pub struct AuditBuffer(Arc<Mutex<Vec<u8>>>);

impl AuditBuffer {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for AuditBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Fixture {
    pub store: Arc<FakeStore>,
    pub audit: AuditBuffer,
    pub service: ProjectService,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(FakeStore::default());
    let audit = AuditBuffer::default();
    let service = ProjectService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(AuditLog::from_writer(audit.clone())),
    );
    Fixture {
        store,
        audit,
        service,
    }
}

pub fn admin() -> Identity {
    Identity::new(UserId::new(1), Role::Admin)
}

pub fn member(id: u32) -> Identity {
    Identity::new(UserId::new(id), Role::Member)
}

pub fn sample_project(team: TeamId) -> Project {
    Project {
        id: ProjectId::new(0),
        name: "Apollo".to_string(),
        description: "moon landing".to_string(),
        start_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        planned_end_date: Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
        actual_end_date: None,
        status: "active".to_string(),
        priority: 1,
        team_id: team,
        budget: 1000.0,
    }
}
