use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::User;

/// Request body for create and update, before validation.
#[derive(Debug, Default, Deserialize)]
pub struct RawUserInput {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar: Option<String>,
}

/// `avatar: None` leaves the stored avatar untouched.
#[derive(Debug, Clone)]
pub struct UpdateUserInput {
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub avatar: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            avatar: u.avatar,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self { user: u.into() }
    }
}
