use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::repo_types::{NewUser, User};
use crate::error::{AppError, UniqueField};

pub const EMAIL_CONSTRAINT: &str = "users_email_key";
pub const USERNAME_CONSTRAINT: &str = "users_username_key";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A storage-level uniqueness constraint rejected the write.
    #[error("duplicate {0:?}")]
    Duplicate(UniqueField),

    #[error(transparent)]
    Database(sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                match db_err.constraint() {
                    Some(EMAIL_CONSTRAINT) => return StoreError::Duplicate(UniqueField::Email),
                    Some(USERNAME_CONSTRAINT) => {
                        return StoreError::Duplicate(UniqueField::Username)
                    }
                    _ => {}
                }
            }
        }
        StoreError::Database(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(field) => AppError::Conflict(field),
            StoreError::Database(e) => AppError::Internal(e.into()),
            StoreError::Other(e) => AppError::Internal(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence seam for users.
///
/// Implementations must enforce uniqueness of `email` and `username` on both
/// `insert` and `update`, reporting violations as [`StoreError::Duplicate`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn insert(&self, user: NewUser) -> StoreResult<User>;
    /// Persists every mutable field of `user`, keyed by `user.id`.
    async fn update(&self, user: User) -> StoreResult<User>;
}

const USER_COLUMNS: &str = "id, email, username, password_hash, avatar, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: &str, value: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.find_one("username", username).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (email, username, password_hash, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.email)
            .bind(user.username)
            .bind(user.password_hash)
            .bind(user.avatar)
            .fetch_one(&self.db)
            .await?;
        Ok(user)
    }

    async fn update(&self, user: User) -> StoreResult<User> {
        let sql = format!(
            r#"
            UPDATE users
               SET email = $2, username = $3, password_hash = $4, avatar = $5,
                   updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(user.email)
            .bind(user.username)
            .bind(user.password_hash)
            .bind(user.avatar)
            .fetch_optional(&self.db)
            .await?;
        updated.ok_or_else(|| anyhow::anyhow!("user {} vanished during update", user.id).into())
    }
}
