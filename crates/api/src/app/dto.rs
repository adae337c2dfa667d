use serde::{Deserialize, Serialize};

use taskforge_auth::{RegisterUser, Role};
use taskforge_core::AppError;

const MIN_PASSWORD_LEN: usize = 8;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// `"admin"` registers an admin; anything else (or nothing) a member.
    ///
    /// Registration is public and the role is self-declared, so any caller can
    /// obtain an admin token. Deployments that need a gate put it in front of
    /// this route.
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterRequest {
    /// Boundary checks, then conversion into the use-case command.
    pub fn into_command(self) -> Result<RegisterUser, AppError> {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::validation("username must not be empty"));
        }
        if !self.email.contains('@') {
            return Err(AppError::validation("email must contain '@'"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        Ok(RegisterUser {
            username,
            email: self.email.trim().to_string(),
            password: self.password,
            role: self.role.as_deref().map(Role::parse).unwrap_or(Role::Member),
        })
    }
}

impl core::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: None,
        }
    }

    #[test]
    fn valid_registration_defaults_to_member() {
        let cmd = request(" alice ", "alice@example.com", "long-enough")
            .into_command()
            .unwrap();
        assert_eq!(cmd.username, "alice");
        assert_eq!(cmd.role, Role::Member);
    }

    #[test]
    fn boundary_rules_are_enforced() {
        for bad in [
            request("", "a@b.c", "long-enough"),
            request("alice", "not-an-email", "long-enough"),
            request("alice", "a@b.c", "short"),
        ] {
            assert!(matches!(bad.into_command(), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn role_string_is_parsed() {
        let mut req = request("root", "root@example.com", "long-enough");
        req.role = Some("admin".to_string());
        assert_eq!(req.into_command().unwrap().role, Role::Admin);

        let mut req = request("bob", "bob@example.com", "long-enough");
        req.role = Some("superuser".to_string());
        assert_eq!(req.into_command().unwrap().role, Role::Member);
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", request("alice", "a@b.c", "hunter2hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
