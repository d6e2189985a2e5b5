use crate::{config::Config, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Email confirmation and password reset links stay valid for a week.
const EMAIL_TOKEN_TTL_DAYS: i64 = 7;

/// What a token may be used for. A token is only accepted where its type is expected,
/// so a refresh token cannot authenticate a request and an access token cannot be
/// exchanged for a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
    Email,
}

/// Represents the claims encoded within a JWT.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Username for access/refresh tokens, email address for email tokens.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    pub token_type: TokenType,
}

/// Issues and verifies HS256 tokens signed with the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::minutes(config.access_token_expire_minutes),
            Duration::minutes(config.refresh_token_expire_minutes),
        )
    }

    fn issue(&self, sub: &str, ttl: Duration, token_type: TokenType) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: sub.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            token_type,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    pub fn create_access_token(&self, username: &str) -> Result<String, AppError> {
        self.issue(username, self.access_ttl, TokenType::Access)
    }

    pub fn create_refresh_token(&self, username: &str) -> Result<String, AppError> {
        self.issue(username, self.refresh_ttl, TokenType::Refresh)
    }

    pub fn create_email_token(&self, email: &str) -> Result<String, AppError> {
        self.issue(email, Duration::days(EMAIL_TOKEN_TTL_DAYS), TokenType::Email)
    }

    /// Checks signature, expiry and token type.
    ///
    /// # Returns
    /// The decoded `Claims`, or `AppError::Unauthorized` if the token is malformed,
    /// signed with another key, expired, or of a different type than `expected`.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::default())?.claims;

        if claims.token_type != expected {
            return Err(AppError::Unauthorized("Invalid token type".into()));
        }
        Ok(claims)
    }

    /// Email address carried by a confirmation/reset token, if the token is valid.
    pub fn email_from_token(&self, token: &str) -> Option<String> {
        self.verify(token, TokenType::Email)
            .map(|claims| claims.sub)
            .ok()
    }
}
