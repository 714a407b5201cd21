use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateUserInput, UpdateUserInput};
use super::password::Hasher;
use super::repo::UserRepository;
use super::repo_types::{NewUser, User};
use crate::error::{AppError, AppResult, UniqueField};

/// Creates a user after checking email, then username, for prior use.
///
/// The check is not atomic; a racing insert is caught by the store's
/// unique constraint and reported as the same conflict.
#[instrument(skip(repo, hasher, input), fields(email = %input.email, username = %input.username))]
pub async fn create_user(
    repo: &dyn UserRepository,
    hasher: &Hasher,
    input: CreateUserInput,
) -> AppResult<User> {
    if repo.find_by_email(&input.email).await?.is_some() {
        warn!("email already in use");
        return Err(AppError::Conflict(UniqueField::Email));
    }
    if repo.find_by_username(&input.username).await?.is_some() {
        warn!("username already in use");
        return Err(AppError::Conflict(UniqueField::Username));
    }

    let password_hash = hasher.hash(&input.password)?;
    let user = repo
        .insert(NewUser {
            email: input.email,
            username: input.username,
            password_hash,
            avatar: input.avatar,
        })
        .await?;

    info!(user_id = %user.id, "user created");
    Ok(user)
}

/// Overwrites credentials on an existing user. The avatar is replaced only
/// when one is supplied. No application-level uniqueness check is made here.
#[instrument(skip(repo, hasher, input))]
pub async fn update_user(
    repo: &dyn UserRepository,
    hasher: &Hasher,
    id: Uuid,
    input: UpdateUserInput,
) -> AppResult<User> {
    let mut user = repo.find_by_id(id).await?.ok_or_else(|| {
        warn!(user_id = %id, "update of unknown user");
        AppError::NotFound
    })?;

    user.email = input.email;
    user.username = input.username;
    user.password_hash = hasher.hash(&input.password)?;
    if input.avatar.is_some() {
        user.avatar = input.avatar;
    }

    let user = repo.update(user).await?;
    info!(user_id = %user.id, "user updated");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashConfig;
    use crate::users::memory::MemoryUserRepository;

    fn hasher() -> Hasher {
        Hasher::new(&HashConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn create_input(email: &str, username: &str) -> CreateUserInput {
        CreateUserInput {
            email: email.into(),
            username: username.into(),
            password: "test123".into(),
            avatar: Some("images.com/image/1".into()),
        }
    }

    fn update_input(user: &User, password: &str, avatar: Option<&str>) -> UpdateUserInput {
        UpdateUserInput {
            email: user.email.clone(),
            username: user.username.clone(),
            password: password.into(),
            avatar: avatar.map(Into::into),
        }
    }

    #[tokio::test]
    async fn create_stores_hashed_password() {
        let repo = MemoryUserRepository::new();
        let h = hasher();
        let user = create_user(&repo, &h, create_input("test@email.com", "test"))
            .await
            .unwrap();

        assert_eq!(user.email, "test@email.com");
        assert_ne!(user.password_hash, "test123");
        assert!(h.verify("test123", &user.password_hash).unwrap());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn email_conflict_wins_over_username_conflict() {
        let repo = MemoryUserRepository::new();
        let h = hasher();
        create_user(&repo, &h, create_input("a@b.io", "alice")).await.unwrap();

        let err = create_user(&repo, &h, create_input("a@b.io", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(UniqueField::Email)));
        assert_eq!(err.to_string(), "Email is already in use");

        let err = create_user(&repo, &h, create_input("new@b.io", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(UniqueField::Username)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn update_rehashes_and_keeps_id() {
        let repo = MemoryUserRepository::new();
        let h = hasher();
        let user = create_user(&repo, &h, create_input("a@b.io", "alice")).await.unwrap();

        let input = update_input(&user, "brand-new", Some("http://github.com/x"));
        let updated = update_user(&repo, &h, user.id, input).await.unwrap();

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.avatar.as_deref(), Some("http://github.com/x"));
        assert!(h.verify("brand-new", &updated.password_hash).unwrap());
        assert!(!h.verify("test123", &updated.password_hash).unwrap());
    }

    #[tokio::test]
    async fn update_with_same_password_still_rehashes() {
        let repo = MemoryUserRepository::new();
        let h = hasher();
        let user = create_user(&repo, &h, create_input("a@b.io", "alice")).await.unwrap();

        let updated = update_user(&repo, &h, user.id, update_input(&user, "test123", None))
            .await
            .unwrap();
        assert_ne!(updated.password_hash, user.password_hash);
        assert!(h.verify("test123", &updated.password_hash).unwrap());
    }

    #[tokio::test]
    async fn update_without_avatar_keeps_stored_one() {
        let repo = MemoryUserRepository::new();
        let h = hasher();
        let user = create_user(&repo, &h, create_input("a@b.io", "alice")).await.unwrap();

        let updated = update_user(&repo, &h, user.id, update_input(&user, "another", None))
            .await
            .unwrap();
        assert_eq!(updated.avatar.as_deref(), Some("images.com/image/1"));
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let repo = MemoryUserRepository::new();
        let h = hasher();
        let input = UpdateUserInput {
            email: "a@b.io".into(),
            username: "alice".into(),
            password: "secret".into(),
            avatar: None,
        };
        let err = update_user(&repo, &h, Uuid::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn update_onto_taken_email_hits_store_constraint() {
        let repo = MemoryUserRepository::new();
        let h = hasher();
        let alice = create_user(&repo, &h, create_input("a@b.io", "alice")).await.unwrap();
        create_user(&repo, &h, create_input("b@b.io", "bob")).await.unwrap();

        let mut input = update_input(&alice, "secret", None);
        input.email = "b@b.io".into();
        let err = update_user(&repo, &h, alice.id, input).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(UniqueField::Email)));
    }
}
