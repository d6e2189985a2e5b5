use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

/// A row of the `users` table.
///
/// Deliberately not `Serialize`: it carries the password hash and the stored
/// refresh token. Responses go through `UserResponse`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub refresh_token: Option<String>,
    pub avatar: Option<String>,
    pub confirmed: bool,
    pub role: UserRole,
}

/// Public view of a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            role: user.role,
            confirmed: user.confirmed,
            created_at: user.created_at,
        }
    }
}

/// Fields needed to insert a user; the password is already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
}

/// Gravatar image URL for `email`, keyed by the md5 of the trimmed, lowercased address.
/// Built locally; Gravatar serves a default image for unknown addresses.
pub fn gravatar_url(email: &str) -> String {
    let digest = md5::compute(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}", digest)
}

#[derive(Debug, Deserialize, Validate)]
pub struct AvatarUpdate {
    #[validate(url, length(max = 255))]
    pub avatar_url: String,
}
