use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::{StoreError, StoreResult, UserRepository};
use super::repo_types::{NewUser, User};
use crate::error::UniqueField;

/// Process-local user store.
///
/// Uniqueness is checked under the write lock, so it holds the same
/// constraints as the `users` table.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

fn check_unique(
    users: &HashMap<Uuid, User>,
    skip: Option<Uuid>,
    email: &str,
    username: &str,
) -> StoreResult<()> {
    let mut others = users.values().filter(|u| Some(u.id) != skip);
    if others.clone().any(|u| u.email == email) {
        return Err(StoreError::Duplicate(UniqueField::Email));
    }
    if others.any(|u| u.username == username) {
        return Err(StoreError::Duplicate(UniqueField::Username));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, new: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        check_unique(&users, None, &new.email, &new.username)?;

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            username: new.username,
            password_hash: new.password_hash,
            avatar: new.avatar,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        check_unique(&users, Some(user.id), &user.email, &user.username)?;

        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| anyhow::anyhow!("user {} vanished during update", user.id))?;
        stored.email = user.email;
        stored.username = user.username;
        stored.password_hash = user.password_hash;
        stored.avatar = user.avatar;
        stored.updated_at = OffsetDateTime::now_utc();
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.into(),
            username: username.into(),
            password_hash: "hash".into(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_finds_by_each_key() {
        let repo = MemoryUserRepository::new();
        let user = repo.insert(new_user("a@b.io", "alice")).await.unwrap();

        assert_eq!(repo.find_by_id(user.id).await.unwrap().unwrap().email, "a@b.io");
        assert_eq!(repo.find_by_email("a@b.io").await.unwrap().unwrap().id, user.id);
        assert_eq!(repo.find_by_username("alice").await.unwrap().unwrap().id, user.id);
        assert!(repo.find_by_email("A@B.IO").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_enforces_unique_columns() {
        let repo = MemoryUserRepository::new();
        repo.insert(new_user("a@b.io", "alice")).await.unwrap();

        let dup_email = repo.insert(new_user("a@b.io", "bob")).await.unwrap_err();
        assert!(matches!(dup_email, StoreError::Duplicate(UniqueField::Email)));

        let dup_name = repo.insert(new_user("b@b.io", "alice")).await.unwrap_err();
        assert!(matches!(dup_name, StoreError::Duplicate(UniqueField::Username)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn update_allows_own_values_but_not_others() {
        let repo = MemoryUserRepository::new();
        let alice = repo.insert(new_user("a@b.io", "alice")).await.unwrap();
        repo.insert(new_user("b@b.io", "bob")).await.unwrap();

        let mut same = alice.clone();
        same.password_hash = "other".into();
        let saved = repo.update(same).await.unwrap();
        assert_eq!(saved.id, alice.id);
        assert_eq!(saved.password_hash, "other");
        assert_eq!(saved.created_at, alice.created_at);

        let mut stolen = alice.clone();
        stolen.username = "bob".into();
        let err = repo.update(stolen).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueField::Username)));
    }
}
