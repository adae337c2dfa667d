use serde::{Deserialize, Serialize};

use taskforge_core::UserId;

use crate::Role;

/// Verified identity of the caller of a request.
///
/// Rebuilt from the bearer token on every request and passed explicitly into
/// every use-case; it is never cached or mutated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.user_id, self.role)
    }
}
