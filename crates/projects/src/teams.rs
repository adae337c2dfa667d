//! Team and member use-cases.

use std::collections::HashSet;

use serde::Deserialize;

use taskforge_auth::{Action, CommandAuthorization, Identity, Resource};
use taskforge_core::{AppError, AppResult, TeamId, UserId};

use crate::model::{Member, MemberFilter, Team};
use crate::service::{ProjectService, store_err};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateTeam {
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    pub manager_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateTeam {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    pub manager_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeleteTeam {
    pub id: TeamId,
}

impl CommandAuthorization for CreateTeam {
    fn required_action(&self) -> Action {
        Action::create(Resource::Team)
    }
}

impl CommandAuthorization for UpdateTeam {
    fn required_action(&self) -> Action {
        Action::update(Resource::Team)
    }
}

impl CommandAuthorization for DeleteTeam {
    fn required_action(&self) -> Action {
        Action::delete(Resource::Team)
    }
}

fn validate_team(name: &str, members: &[Member]) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("team name must not be empty"));
    }

    let mut seen = HashSet::with_capacity(members.len());
    if let Some(dup) = members.iter().find(|m| !seen.insert(m.id)) {
        return Err(AppError::validation(format!(
            "member {} is listed more than once",
            dup.id
        )));
    }
    Ok(())
}

impl CreateTeam {
    pub fn validate(&self) -> AppResult<()> {
        validate_team(&self.name, &self.members)
    }
}

impl UpdateTeam {
    pub fn validate(&self) -> AppResult<()> {
        validate_team(&self.name, &self.members)
    }
}

impl ProjectService {
    /// All teams for admins; only the caller's resolved team for members.
    pub async fn list_teams(&self, identity: &Identity) -> AppResult<Vec<Team>> {
        self.guard_action(identity, Action::read(Resource::Team))?;

        let scope = if identity.is_admin() {
            None
        } else {
            match self.caller_team(identity).await? {
                Some(team) => Some(team),
                None => return Ok(Vec::new()),
            }
        };

        let mut teams = self
            .store
            .list_teams()
            .await
            .map_err(store_err("failed to list teams"))?;
        if let Some(own) = scope {
            teams.retain(|t| t.id == own);
        }

        self.audit(identity, "Fetching all teams");
        Ok(teams)
    }

    pub async fn get_team(&self, identity: &Identity, id: TeamId) -> AppResult<Team> {
        self.guard_action(identity, Action::read(Resource::Team))?;

        let team = self
            .store
            .get_team(id)
            .await
            .map_err(store_err("failed to get team"))?;
        self.authorize_read(identity, Resource::Team, team.id).await?;

        self.audit(identity, &format!("Fetching team (id: {id})"));
        Ok(team)
    }

    pub async fn create_team(&self, identity: &Identity, cmd: CreateTeam) -> AppResult<Team> {
        self.guard(identity, &cmd)?;
        cmd.validate()?;
        self.check_members(&cmd.members).await?;

        let team = Team {
            id: TeamId::new(0),
            name: cmd.name,
            members: cmd.members,
            manager_id: cmd.manager_id,
        };
        let id = self
            .store
            .create_team(team.clone())
            .await
            .map_err(store_err("failed to create team"))?;

        self.audit(identity, &format!("Creating new team (id: {id})"));
        Ok(Team { id, ..team })
    }

    pub async fn update_team(&self, identity: &Identity, cmd: UpdateTeam) -> AppResult<Team> {
        self.guard(identity, &cmd)?;
        cmd.validate()?;

        self.store
            .get_team(cmd.id)
            .await
            .map_err(store_err("failed to get team"))?;
        self.check_members(&cmd.members).await?;

        let team = Team {
            id: cmd.id,
            name: cmd.name,
            members: cmd.members,
            manager_id: cmd.manager_id,
        };
        self.store
            .update_team(team.clone())
            .await
            .map_err(store_err("failed to update team"))?;

        self.audit(identity, &format!("Updating team (id: {})", team.id));
        Ok(team)
    }

    pub async fn delete_team(&self, identity: &Identity, cmd: DeleteTeam) -> AppResult<()> {
        self.guard(identity, &cmd)?;

        self.store
            .delete_team(cmd.id)
            .await
            .map_err(store_err("failed to delete team"))?;

        self.audit(identity, &format!("Deleting team (id: {})", cmd.id));
        Ok(())
    }

    /// Members matching `filter`. For members the team filter is forced to
    /// their own team.
    pub async fn list_members(
        &self,
        identity: &Identity,
        mut filter: MemberFilter,
    ) -> AppResult<Vec<Member>> {
        self.guard_action(identity, Action::read(Resource::Member))?;

        if !identity.is_admin() {
            match self.caller_team(identity).await? {
                Some(team) => filter.team_id = Some(team),
                None => return Ok(Vec::new()),
            }
        }

        let members = self
            .store
            .list_members(&filter)
            .await
            .map_err(store_err("failed to get members"))?;

        self.audit(identity, "Fetching teams members");
        Ok(members)
    }
}
