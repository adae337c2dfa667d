//! Account use-cases: registration and login.

use std::sync::Arc;

use taskforge_core::{AppError, AppResult, StoreError, UserId};

use crate::{HashedPassword, Hs256Tokens, Identity, PasswordHasher, Role, TokenIssuer, TokenVerifier};

/// A user to be persisted. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: HashedPassword,
    pub role: Role,
}

/// A persisted user together with its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: HashedPassword,
    pub role: Role,
}

impl UserRecord {
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }
}

/// Storage collaborator for accounts.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user and return its assigned id.
    async fn create(&self, user: NewUser) -> Result<UserId, StoreError>;

    /// Look a user up by exact username. Absence is `StoreError::NotFound`.
    async fn find_by_username(&self, username: &str) -> Result<UserRecord, StoreError>;
}

/// Registration command.
///
/// Boundary rules (password length, email shape) are enforced by the
/// transport layer before this is built.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl core::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

pub struct AccountService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    issuer: Arc<dyn TokenIssuer>,
    verifier: Arc<dyn TokenVerifier>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: Arc<Hs256Tokens>) -> Self {
        Self {
            users,
            hasher: Arc::new(hasher),
            issuer: tokens.clone(),
            verifier: tokens,
        }
    }

    /// Register a new account and return a bearer token for it.
    pub async fn register(&self, cmd: RegisterUser) -> AppResult<String> {
        match self.users.find_by_username(&cmd.username).await {
            Err(StoreError::NotFound) => {}
            Ok(_) => return Err(AppError::AlreadyExists),
            Err(e) => {
                return Err(AppError::internal(format!(
                    "failed to get user by username {:?}: {e}",
                    cmd.username
                )));
            }
        }

        let password_hash = self.hash_password(cmd.password).await?;

        let user_id = self
            .users
            .create(NewUser {
                username: cmd.username.clone(),
                email: cmd.email,
                password_hash,
                role: cmd.role,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict => AppError::AlreadyExists,
                other => AppError::internal(format!("failed to create user: {other}")),
            })?;

        let identity = Identity::new(user_id, cmd.role);
        let token = self.issuer.issue(identity)?;

        tracing::info!(user_id = %user_id, role = %cmd.role, username = %cmd.username, "user registered");
        Ok(token)
    }

    /// Verify credentials and return a fresh bearer token.
    ///
    /// An unknown username and a wrong password yield the same
    /// [`AppError::InvalidCredentials`].
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        let user = match self.users.find_by_username(username).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(AppError::InvalidCredentials),
            Err(e) => {
                return Err(AppError::internal(format!(
                    "failed to get user by username {username:?}: {e}"
                )));
            }
        };

        if !self.verify_password(user.password_hash.clone(), password.to_string()).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issuer.issue(user.identity())?;

        tracing::info!(user_id = %user.id, role = %user.role, "user logged in");
        Ok(token)
    }

    /// Resolve a bearer token into the caller's identity.
    pub fn authenticate(&self, token: &str) -> AppResult<Identity> {
        self.verifier.verify(token).map_err(|e| {
            tracing::debug!(reason = %e, "token rejected");
            AppError::from(e)
        })
    }

    // Argon2 is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, password: String) -> AppResult<HashedPassword> {
        let hasher = self.hasher.clone();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::internal(format!("hashing task failed: {e}")))??;
        Ok(hashed)
    }

    async fn verify_password(&self, hash: HashedPassword, password: String) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AppError::internal(format!("verification task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::password::fast_hasher;

    #[derive(Default)]
    struct FakeUsers {
        rows: Mutex<HashMap<String, UserRecord>>,
        broken: bool,
    }

    #[async_trait::async_trait]
    impl UserStore for FakeUsers {
        async fn create(&self, user: NewUser) -> Result<UserId, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&user.username) {
                return Err(StoreError::Conflict);
            }
            let id = UserId::new(rows.len() as u32 + 1);
            rows.insert(
                user.username.clone(),
                UserRecord {
                    id,
                    username: user.username,
                    email: user.email,
                    password_hash: user.password_hash,
                    role: user.role,
                },
            );
            Ok(id)
        }

        async fn find_by_username(&self, username: &str) -> Result<UserRecord, StoreError> {
            if self.broken {
                return Err(StoreError::unavailable("connection reset by peer"));
            }
            self.rows
                .lock()
                .unwrap()
                .get(username)
                .cloned()
                .ok_or(StoreError::NotFound)
        }
    }

    fn tokens() -> Arc<Hs256Tokens> {
        Arc::new(Hs256Tokens::new(b"accounts-test"))
    }

    fn service_with(users: FakeUsers) -> (AccountService, Arc<Hs256Tokens>) {
        let tokens = tokens();
        let service = AccountService::new(Arc::new(users), fast_hasher(), tokens.clone());
        (service, tokens)
    }

    fn register_cmd(username: &str, role: Role) -> RegisterUser {
        RegisterUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "hunter2hunter2".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn register_issues_token_for_new_identity() {
        let (service, tokens) = service_with(FakeUsers::default());

        let token = service.register(register_cmd("alice", Role::Member)).await.unwrap();
        let identity = tokens.verify(&token).unwrap();

        assert_eq!(identity, Identity::new(UserId::new(1), Role::Member));
    }

    #[tokio::test]
    async fn duplicate_username_is_already_exists() {
        let (service, _) = service_with(FakeUsers::default());
        service.register(register_cmd("alice", Role::Member)).await.unwrap();

        let err = service.register(register_cmd("alice", Role::Admin)).await.unwrap_err();
        assert_eq!(err, AppError::AlreadyExists);
    }

    #[tokio::test]
    async fn lookup_failure_during_register_is_internal() {
        let (service, _) = service_with(FakeUsers {
            broken: true,
            ..Default::default()
        });

        let err = service.register(register_cmd("alice", Role::Member)).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.to_string(), "internal error");
    }

    #[tokio::test]
    async fn login_returns_token_for_stored_identity() {
        let (service, tokens) = service_with(FakeUsers::default());
        service.register(register_cmd("bob", Role::Admin)).await.unwrap();

        let token = service.login("bob", "hunter2hunter2").await.unwrap();
        assert_eq!(
            tokens.verify(&token).unwrap(),
            Identity::new(UserId::new(1), Role::Admin)
        );
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let (service, _) = service_with(FakeUsers::default());
        service.register(register_cmd("carol", Role::Member)).await.unwrap();

        let unknown = service.login("nobody", "hunter2hunter2").await.unwrap_err();
        let wrong = service.login("carol", "wrong-password").await.unwrap_err();

        assert_eq!(unknown, AppError::InvalidCredentials);
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn login_lookup_failure_is_internal_not_invalid_credentials() {
        let (service, _) = service_with(FakeUsers {
            broken: true,
            ..Default::default()
        });

        let err = service.login("carol", "whatever1").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn authenticate_distinguishes_token_failures() {
        let (service, tokens) = service_with(FakeUsers::default());
        let identity = Identity::new(UserId::new(4), Role::Member);

        let token = tokens.issue(identity).unwrap();
        assert_eq!(service.authenticate(&token), Ok(identity));

        let stale = tokens
            .issue_at(identity, chrono::Utc::now() - chrono::Duration::hours(2))
            .unwrap();
        assert_eq!(service.authenticate(&stale), Err(AppError::TokenExpired));

        assert_eq!(service.authenticate("garbage"), Err(AppError::InvalidToken));
    }

    #[test]
    fn register_command_debug_hides_password() {
        let rendered = format!("{:?}", register_cmd("dave", Role::Member));
        assert!(!rendered.contains("hunter2"));
    }
}
