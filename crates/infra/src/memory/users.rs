use std::collections::HashMap;
use std::sync::RwLock;

use taskforge_auth::{MemberAttributes, NewUser, UserRecord, UserStore};
use taskforge_core::{StoreError, UserId};
use taskforge_projects::MemberLookup;

use super::poisoned;

#[derive(Debug, Default)]
struct Users {
    by_id: HashMap<UserId, UserRecord>,
    next_id: u32,
}

/// Account store. Usernames are unique; a duplicate insert is a `Conflict`.
///
/// Also serves member lookups: a member's stored name is the account's username.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Users>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|u| u.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<UserId, StoreError> {
        let mut users = self.inner.write().map_err(poisoned)?;
        if users.by_id.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict);
        }

        users.next_id += 1;
        let id = UserId::new(users.next_id);
        users.by_id.insert(
            id,
            UserRecord {
                id,
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                role: user.role,
            },
        );

        tracing::debug!(user_id = %id, "user stored");
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<UserRecord, StoreError> {
        let users = self.inner.read().map_err(poisoned)?;
        users
            .by_id
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait::async_trait]
impl MemberLookup for InMemoryUserStore {
    async fn member_by_id(&self, id: UserId) -> Result<MemberAttributes, StoreError> {
        let users = self.inner.read().map_err(poisoned)?;
        users
            .by_id
            .get(&id)
            .map(|u| MemberAttributes {
                name: u.username.clone(),
                role: u.role,
            })
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use taskforge_auth::{HashedPassword, Role};

    use super::*;

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: HashedPassword::from_phc("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA"),
            role,
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let store = InMemoryUserStore::new();
        assert_eq!(store.create(new_user("alice", Role::Member)).await, Ok(UserId::new(1)));
        assert_eq!(store.create(new_user("bob", Role::Admin)).await, Ok(UserId::new(2)));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = InMemoryUserStore::new();
        store.create(new_user("alice", Role::Member)).await.unwrap();
        assert_eq!(
            store.create(new_user("alice", Role::Admin)).await,
            Err(StoreError::Conflict)
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn lookups_report_absence_as_not_found() {
        let store = InMemoryUserStore::new();
        assert_eq!(
            store.find_by_username("nobody").await.unwrap_err(),
            StoreError::NotFound
        );
        assert_eq!(
            store.member_by_id(UserId::new(3)).await.unwrap_err(),
            StoreError::NotFound
        );
    }

    #[tokio::test]
    async fn member_attributes_come_from_the_account() {
        let store = InMemoryUserStore::new();
        let id = store.create(new_user("carol", Role::Admin)).await.unwrap();

        assert_eq!(
            store.member_by_id(id).await.unwrap(),
            MemberAttributes {
                name: "carol".to_string(),
                role: Role::Admin,
            }
        );
    }
}
