pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::{AdminUser, AuthenticatedUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService, TokenType};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    pub(crate) static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Payload for a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// 3 to 32 characters: letters, digits, underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    /// At least 6 characters.
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}

/// Body returned by registration. The account still needs its email confirmed
/// before it can log in.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Login credentials, accepted as a JSON body or as an urlencoded form.
///
/// Not validated: any mismatch is reported as 401 by the login handler.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RequestEmail {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}
