use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{NewUser, User};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, created_at, refresh_token, avatar, confirmed, role";

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let sql = format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS);
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?)
}

/// The user whose stored refresh token is exactly `refresh_token`.
pub async fn find_by_refresh_token(
    pool: &PgPool,
    username: &str,
    refresh_token: &str,
) -> Result<Option<User>, AppError> {
    let sql = format!(
        "SELECT {} FROM users WHERE username = $1 AND refresh_token = $2",
        USER_COLUMNS
    );
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .bind(refresh_token)
        .fetch_optional(pool)
        .await?)
}

/// Inserts an unconfirmed user with the default role.
///
/// A concurrent registration that wins the race on `username` or `email` surfaces
/// as `AppError::Conflict` through the unique constraints.
pub async fn create(pool: &PgPool, new_user: &NewUser) -> Result<User, AppError> {
    let sql = format!(
        "INSERT INTO users (username, email, password_hash, avatar) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {}",
        USER_COLUMNS
    );
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.avatar)
        .fetch_one(pool)
        .await?)
}

pub async fn set_refresh_token(
    pool: &PgPool,
    user_id: i32,
    refresh_token: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET refresh_token = $1 WHERE id = $2")
        .bind(refresh_token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn confirm_email(pool: &PgPool, email: &str) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE users SET confirmed = TRUE WHERE lower(email) = lower($1)")
        .bind(email)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }
    Ok(())
}

/// Replaces the password hash and drops the stored refresh token, which ends
/// every session that relied on it.
pub async fn update_password(pool: &PgPool, email: &str, password_hash: &str) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE users SET password_hash = $1, refresh_token = NULL WHERE lower(email) = lower($2)",
    )
    .bind(password_hash)
    .bind(email)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }
    Ok(())
}

pub async fn update_avatar(pool: &PgPool, user_id: i32, avatar_url: &str) -> Result<User, AppError> {
    let sql = format!(
        "UPDATE users SET avatar = $1 WHERE id = $2 RETURNING {}",
        USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(avatar_url)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
