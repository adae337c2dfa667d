//! Project use-cases.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use taskforge_auth::{Action, CommandAuthorization, Identity, Resource};
use taskforge_core::{AppError, AppResult, ProjectId, TeamId};

use crate::model::Project;
use crate::service::{ProjectService, reference_err, store_err};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to the time of creation.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    pub planned_end_date: DateTime<Utc>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: u32,
    pub team_id: TeamId,
    #[serde(default)]
    pub budget: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateProject {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub planned_end_date: DateTime<Utc>,
    #[serde(default)]
    pub actual_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: u32,
    pub team_id: TeamId,
    #[serde(default)]
    pub budget: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeleteProject {
    pub id: ProjectId,
}

impl CommandAuthorization for CreateProject {
    fn required_action(&self) -> Action {
        Action::create(Resource::Project)
    }
}

impl CommandAuthorization for UpdateProject {
    fn required_action(&self) -> Action {
        Action::update(Resource::Project)
    }
}

impl CommandAuthorization for DeleteProject {
    fn required_action(&self) -> Action {
        Action::delete(Resource::Project)
    }
}

fn validate_fields(
    name: &str,
    start: DateTime<Utc>,
    planned_end: DateTime<Utc>,
    budget: f64,
) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("project name must not be empty"));
    }
    if planned_end < start {
        return Err(AppError::validation(
            "planned end date must not be before the start date",
        ));
    }
    if !budget.is_finite() || budget < 0.0 {
        return Err(AppError::validation("budget must be a non-negative number"));
    }
    Ok(())
}

impl CreateProject {
    pub fn validate(&self, now: DateTime<Utc>) -> AppResult<()> {
        validate_fields(
            &self.name,
            self.start_date.unwrap_or(now),
            self.planned_end_date,
            self.budget,
        )
    }

    fn into_project(self, now: DateTime<Utc>) -> Project {
        Project {
            id: ProjectId::new(0),
            name: self.name,
            description: self.description,
            start_date: self.start_date.unwrap_or(now),
            planned_end_date: self.planned_end_date,
            actual_end_date: None,
            status: self.status,
            priority: self.priority,
            team_id: self.team_id,
            budget: self.budget,
        }
    }
}

impl UpdateProject {
    pub fn validate(&self) -> AppResult<()> {
        validate_fields(&self.name, self.start_date, self.planned_end_date, self.budget)?;
        if self.actual_end_date.is_some_and(|end| end < self.start_date) {
            return Err(AppError::validation(
                "actual end date must not be before the start date",
            ));
        }
        Ok(())
    }

    fn into_project(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            description: self.description,
            start_date: self.start_date,
            planned_end_date: self.planned_end_date,
            actual_end_date: self.actual_end_date,
            status: self.status,
            priority: self.priority,
            team_id: self.team_id,
            budget: self.budget,
        }
    }
}

impl ProjectService {
    /// All projects for admins; the caller's team projects for members.
    pub async fn list_projects(&self, identity: &Identity) -> AppResult<Vec<Project>> {
        self.guard_action(identity, Action::read(Resource::Project))?;

        let scope = if identity.is_admin() {
            None
        } else {
            match self.caller_team(identity).await? {
                Some(team) => Some(team),
                None => return Ok(Vec::new()),
            }
        };

        let mut projects = self
            .store
            .list_projects()
            .await
            .map_err(store_err("failed to list projects"))?;
        if let Some(team) = scope {
            projects.retain(|p| p.team_id == team);
        }

        self.audit(identity, "Fetching all projects");
        Ok(projects)
    }

    pub async fn get_project(&self, identity: &Identity, id: ProjectId) -> AppResult<Project> {
        self.guard_action(identity, Action::read(Resource::Project))?;

        let project = self
            .store
            .get_project(id)
            .await
            .map_err(store_err("failed to get project"))?;
        self.authorize_read(identity, Resource::Project, project.team_id)
            .await?;

        self.audit(identity, &format!("Fetching project by id: {id}"));
        Ok(project)
    }

    pub async fn create_project(&self, identity: &Identity, cmd: CreateProject) -> AppResult<Project> {
        self.guard(identity, &cmd)?;
        let now = Utc::now();
        cmd.validate(now)?;

        self.store
            .get_team(cmd.team_id)
            .await
            .map_err(reference_err("team"))?;

        let project = cmd.into_project(now);
        let id = self
            .store
            .create_project(project.clone())
            .await
            .map_err(store_err("failed to create project"))?;

        self.audit(identity, &format!("Creating new project (id: {id})"));
        Ok(Project { id, ..project })
    }

    pub async fn update_project(&self, identity: &Identity, cmd: UpdateProject) -> AppResult<Project> {
        self.guard(identity, &cmd)?;
        cmd.validate()?;

        self.store
            .get_project(cmd.id)
            .await
            .map_err(store_err("failed to get project"))?;
        self.store
            .get_team(cmd.team_id)
            .await
            .map_err(reference_err("team"))?;

        let project = cmd.into_project();
        self.store
            .update_project(project.clone())
            .await
            .map_err(store_err("failed to update project"))?;

        self.audit(identity, &format!("Updating project (id: {})", project.id));
        Ok(project)
    }

    pub async fn delete_project(&self, identity: &Identity, cmd: DeleteProject) -> AppResult<()> {
        self.guard(identity, &cmd)?;

        self.store
            .delete_project(cmd.id)
            .await
            .map_err(store_err("failed to delete project"))?;

        self.audit(identity, &format!("Deleting project (id: {})", cmd.id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::fakes::{admin, fixture, member, sample_project};

    fn create_cmd(team: TeamId) -> CreateProject {
        let project = sample_project(team);
        CreateProject {
            name: project.name,
            description: project.description,
            start_date: Some(project.start_date),
            planned_end_date: project.planned_end_date,
            status: project.status,
            priority: project.priority,
            team_id: team,
            budget: project.budget,
        }
    }

    fn update_cmd(id: ProjectId, team: TeamId) -> UpdateProject {
        let project = sample_project(team);
        UpdateProject {
            id,
            name: "Artemis".to_string(),
            description: project.description,
            start_date: project.start_date,
            planned_end_date: project.planned_end_date,
            actual_end_date: None,
            status: "done".to_string(),
            priority: 2,
            team_id: team,
            budget: 5.0,
        }
    }

    #[tokio::test]
    async fn member_delete_is_forbidden_before_any_storage_access() {
        let fx = fixture();

        let err = fx
            .service
            .delete_project(&member(2), DeleteProject { id: ProjectId::new(42) })
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Forbidden);
        assert_eq!(fx.store.calls(), 0);
        assert!(fx.audit.lines().is_empty());
    }

    #[tokio::test]
    async fn admin_delete_of_missing_project_is_not_found() {
        let fx = fixture();
        let err = fx
            .service
            .delete_project(&admin(), DeleteProject { id: ProjectId::new(42) })
            .await
            .unwrap_err();
        assert_eq!(err, AppError::NotFound);
    }

    #[tokio::test]
    async fn member_with_invalid_payload_is_forbidden_not_validation() {
        let fx = fixture();
        let mut cmd = create_cmd(TeamId::new(100));
        cmd.name = String::new();

        let err = fx.service.create_project(&member(2), cmd).await.unwrap_err();
        assert_eq!(err, AppError::Forbidden);
    }

    #[tokio::test]
    async fn admin_with_invalid_payload_is_validation() {
        let fx = fixture();
        let team = fx.store.seed_team(100, Vec::new());

        let mut cmd = create_cmd(team);
        cmd.planned_end_date = cmd.start_date.unwrap() - Duration::days(1);

        let err = fx.service.create_project(&admin(), cmd).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(fx.store.calls(), 0);
    }

    #[tokio::test]
    async fn create_project_requires_existing_team() {
        let fx = fixture();
        let err = fx
            .service
            .create_project(&admin(), create_cmd(TeamId::new(404)))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Validation("team does not exist".to_string()));
    }

    #[tokio::test]
    async fn admin_creates_project_and_it_is_audited() {
        let fx = fixture();
        let team = fx.store.seed_team(100, Vec::new());

        let project = fx.service.create_project(&admin(), create_cmd(team)).await.unwrap();

        assert_eq!(project.team_id, team);
        assert_eq!(
            fx.service.get_project(&admin(), project.id).await.unwrap(),
            project
        );
        let lines = fx.audit.lines();
        assert!(lines[0].ends_with(&format!(
            "UserID: 1, Role: admin - Creating new project (id: {})",
            project.id
        )));
    }

    #[tokio::test]
    async fn update_of_missing_project_is_not_found() {
        let fx = fixture();
        let team = fx.store.seed_team(100, Vec::new());

        let err = fx
            .service
            .update_project(&admin(), update_cmd(ProjectId::new(999), team))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::NotFound);
    }

    #[tokio::test]
    async fn admin_updates_project() {
        let fx = fixture();
        let team = fx.store.seed_team(100, Vec::new());
        let id = fx.store.seed_project(200, team);

        let updated = fx
            .service
            .update_project(&admin(), update_cmd(id, team))
            .await
            .unwrap();

        assert_eq!(updated.name, "Artemis");
        assert_eq!(fx.service.get_project(&admin(), id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn member_reads_only_own_team_projects() {
        let fx = fixture();
        let alice = fx.store.add_user(2, "alice", taskforge_auth::Role::Member);
        let own = fx.store.seed_team(100, vec![alice]);
        let other = fx.store.seed_team(101, Vec::new());
        let mine = fx.store.seed_project(200, own);
        let theirs = fx.store.seed_project(201, other);

        assert_eq!(fx.service.get_project(&member(2), mine).await.unwrap().id, mine);
        assert_eq!(
            fx.service.get_project(&member(2), theirs).await.unwrap_err(),
            AppError::Forbidden
        );

        let listed: Vec<ProjectId> = fx
            .service
            .list_projects(&member(2))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(listed, vec![mine]);

        assert_eq!(fx.service.list_projects(&admin()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn member_without_team_sees_nothing() {
        let fx = fixture();
        let team = fx.store.seed_team(100, Vec::new());
        let project = fx.store.seed_project(200, team);

        assert!(fx.service.list_projects(&member(9)).await.unwrap().is_empty());
        assert_eq!(
            fx.service.get_project(&member(9), project).await.unwrap_err(),
            AppError::Forbidden
        );
    }

    #[tokio::test]
    async fn failed_team_lookup_is_internal_not_forbidden() {
        let fx = fixture();
        let alice = fx.store.add_user(2, "alice", taskforge_auth::Role::Member);
        let team = fx.store.seed_team(100, vec![alice]);
        let project = fx.store.seed_project(200, team);
        fx.store.break_lookups();

        let err = fx.service.get_project(&member(2), project).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let err = fx.service.list_projects(&member(2)).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        assert!(fx.audit.lines().is_empty());

        // Admins never resolve a team.
        assert!(fx.service.get_project(&admin(), project).await.is_ok());
    }

    #[tokio::test]
    async fn member_reading_missing_project_is_not_found() {
        let fx = fixture();
        let err = fx
            .service
            .get_project(&member(2), ProjectId::new(42))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::NotFound);
    }

    #[test]
    fn update_rejects_actual_end_before_start() {
        let mut cmd = update_cmd(ProjectId::new(1), TeamId::new(1));
        cmd.actual_end_date = Some(cmd.start_date - Duration::hours(1));
        assert!(matches!(cmd.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn negative_budget_is_rejected() {
        let mut cmd = create_cmd(TeamId::new(1));
        cmd.budget = -1.0;
        assert!(cmd.validate(Utc::now()).is_err());
    }
}
