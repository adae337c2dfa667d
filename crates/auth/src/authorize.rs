use serde::Serialize;
use thiserror::Error;

use taskforge_core::{AppError, TeamId, UserId};

use crate::{Action, Identity, Operation, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {0}")]
    Forbidden(DenialReason),
}

impl AuthzError {
    pub fn reason(&self) -> &DenialReason {
        match self {
            AuthzError::Forbidden(reason) => reason,
        }
    }
}

impl From<AuthzError> for AppError {
    fn from(_: AuthzError) -> Self {
        AppError::Forbidden
    }
}

/// Command-side authorization contract.
///
/// Implement this on commands so the use-case layer can check the caller's
/// role before anything else happens.
pub trait CommandAuthorization {
    fn required_action(&self) -> Action;
}

/// Role → action decision table.
///
/// Admins may do everything. Members may only read, and their reads are
/// further narrowed by [`Scope`].
pub struct Policy;

impl Policy {
    pub fn permits(role: Role, action: Action) -> bool {
        match (role, action.operation) {
            (Role::Admin, _) => true,
            (Role::Member, Operation::Read) => true,
            (Role::Member, Operation::Create | Operation::Update | Operation::Delete) => false,
        }
    }
}

/// Team scope of the resource being accessed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scope {
    /// The check does not depend on team membership.
    Unscoped,

    /// The resource belongs to `resource`. `caller` is the caller's team as
    /// resolved for this request (`None` if the caller is in no team).
    Team {
        resource: TeamId,
        caller: Option<TeamId>,
    },

    /// The resource belongs to a single user (e.g. an employee's task list).
    Owner(UserId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenialReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Why a request was denied. Kept for logs and tests; never sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
}

impl core::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    MissingRole,
    OutOfScope,
    NoTeam,
    NotOwner,
    MemberMismatch,
}

/// Decide whether `identity` may perform `action` on a resource in `scope`.
///
/// - No IO
/// - No panics
/// - Admins bypass scope checks entirely
pub fn decide(identity: &Identity, action: Action, scope: Scope) -> Decision {
    if !Policy::permits(identity.role, action) {
        return Decision::Deny(DenialReason {
            kind: DenialKind::MissingRole,
            message: format!("role '{}' may not perform '{}'", identity.role, action),
        });
    }

    if identity.is_admin() {
        return Decision::Allow;
    }

    match scope {
        Scope::Unscoped => Decision::Allow,
        Scope::Team { caller: None, .. } => Decision::Deny(DenialReason {
            kind: DenialKind::NoTeam,
            message: format!("user {} belongs to no team", identity.user_id),
        }),
        Scope::Team {
            resource,
            caller: Some(caller),
        } if resource == caller => Decision::Allow,
        Scope::Team {
            resource,
            caller: Some(caller),
        } => Decision::Deny(DenialReason {
            kind: DenialKind::OutOfScope,
            message: format!(
                "'{}' on team {} denied: user {} belongs to team {}",
                action, resource, identity.user_id, caller
            ),
        }),
        Scope::Owner(owner) if owner == identity.user_id => Decision::Allow,
        Scope::Owner(owner) => Decision::Deny(DenialReason {
            kind: DenialKind::NotOwner,
            message: format!("'{}' on resources of user {} denied", action, owner),
        }),
    }
}

/// [`decide`] as a `Result`, for use with `?`.
pub fn authorize(identity: &Identity, action: Action, scope: Scope) -> Result<(), AuthzError> {
    match decide(identity, action, scope) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            tracing::debug!(
                user_id = %identity.user_id,
                role = %identity.role,
                %action,
                denial = ?reason.kind,
                "authorization denied"
            );
            Err(AuthzError::Forbidden(reason))
        }
    }
}

/// Name and role of a team member, as claimed in a request or as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberAttributes {
    pub name: String,
    pub role: Role,
}

/// Check that a member listed in a team change matches the stored member.
///
/// A member that does not exist (`stored == None`) or whose attributes differ
/// is a denial, never silently dropped.
pub fn check_member_consistency(
    member_id: UserId,
    claimed: &MemberAttributes,
    stored: Option<&MemberAttributes>,
) -> Result<(), AuthzError> {
    let Some(stored) = stored else {
        return Err(AuthzError::Forbidden(DenialReason {
            kind: DenialKind::MemberMismatch,
            message: format!("member {member_id} does not exist"),
        }));
    };

    if stored != claimed {
        return Err(AuthzError::Forbidden(DenialReason {
            kind: DenialKind::MemberMismatch,
            message: format!("member {member_id} does not match the stored member"),
        }));
    }

    Ok(())
}
