//! `ProjectService` and the authorization helpers shared by its use-cases.
//!
//! The operations themselves live next to their commands in
//! [`projects`](crate::projects), [`teams`](crate::teams) and
//! [`tasks`](crate::tasks).

use std::sync::Arc;

use taskforge_auth::{
    Action, CommandAuthorization, Identity, Resource, Scope, authorize, check_member_consistency,
};
use taskforge_core::{AppError, AppResult, StoreError, TeamId};
use taskforge_observability::AuditLog;

use crate::model::Member;
use crate::store::{MemberLookup, ProjectStore, TeamMembership};

pub struct ProjectService {
    pub(crate) store: Arc<dyn ProjectStore>,
    pub(crate) membership: Arc<dyn TeamMembership>,
    pub(crate) members: Arc<dyn MemberLookup>,
    pub(crate) audit: Arc<AuditLog>,
}

impl ProjectService {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        membership: Arc<dyn TeamMembership>,
        members: Arc<dyn MemberLookup>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            store,
            membership,
            members,
            audit,
        }
    }

    /// Role check for a command. Runs before validation and before any storage access.
    pub(crate) fn guard(&self, identity: &Identity, cmd: &impl CommandAuthorization) -> AppResult<()> {
        authorize(identity, cmd.required_action(), Scope::Unscoped)?;
        Ok(())
    }

    /// Role check for an action without a command payload (reads, deletes by id).
    pub(crate) fn guard_action(&self, identity: &Identity, action: Action) -> AppResult<()> {
        authorize(identity, action, Scope::Unscoped)?;
        Ok(())
    }

    /// The caller's current team, or `None` if they belong to none.
    ///
    /// Admins are never resolved; their reads are not scoped.
    pub(crate) async fn caller_team(&self, identity: &Identity) -> AppResult<Option<TeamId>> {
        if identity.is_admin() {
            return Ok(None);
        }

        match self.membership.team_id_for_user(identity.user_id).await {
            Ok(team_id) => Ok(Some(team_id)),
            Err(StoreError::NotFound) => {
                tracing::debug!(user_id = %identity.user_id, "caller belongs to no team");
                Ok(None)
            }
            Err(e) => Err(AppError::internal(format!(
                "failed to resolve team of user {}: {e}",
                identity.user_id
            ))),
        }
    }

    /// Team-scoped read check for a single resource owned by `team`.
    pub(crate) async fn authorize_read(
        &self,
        identity: &Identity,
        resource: Resource,
        team: TeamId,
    ) -> AppResult<()> {
        let caller = self.caller_team(identity).await?;
        authorize(
            identity,
            Action::read(resource),
            Scope::Team {
                resource: team,
                caller,
            },
        )?;
        Ok(())
    }

    /// Every listed member must exist with exactly the stored name and role.
    pub(crate) async fn check_members(&self, members: &[Member]) -> AppResult<()> {
        for member in members {
            let stored = match self.members.member_by_id(member.id).await {
                Ok(stored) => Some(stored),
                Err(StoreError::NotFound) => None,
                Err(e) => {
                    return Err(AppError::internal(format!(
                        "failed to get member {}: {e}",
                        member.id
                    )));
                }
            };
            check_member_consistency(member.id, &member.attributes(), stored.as_ref())?;
        }
        Ok(())
    }

    pub(crate) fn audit(&self, identity: &Identity, message: &str) {
        self.audit.record(identity.user_id, identity.role, message);
    }
}

impl core::fmt::Debug for ProjectService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProjectService")
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}

/// Map a storage failure, keeping absence visible as `NotFound`.
pub(crate) fn store_err(context: &str) -> impl FnOnce(StoreError) -> AppError + '_ {
    move |e| match e {
        StoreError::NotFound => AppError::NotFound,
        StoreError::Conflict => AppError::AlreadyExists,
        StoreError::Unavailable(msg) => AppError::internal(format!("{context}: {msg}")),
    }
}

/// Like [`store_err`], but a missing referenced entity is a payload problem.
pub(crate) fn reference_err(what: &str) -> impl FnOnce(StoreError) -> AppError + '_ {
    move |e| match e {
        StoreError::NotFound => AppError::validation(format!("{what} does not exist")),
        other => store_err(what)(other),
    }
}
