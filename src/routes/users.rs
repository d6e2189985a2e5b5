use crate::{
    auth::{AdminUser, AuthenticatedUser},
    error::AppError,
    models::{AvatarUpdate, UserResponse},
    repository::users,
    services::{ProfileCache, RateLimiter},
};
use actix_web::{get, patch, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Rate limit key: the socket peer. Forwarding headers are client-controlled and ignored.
fn client_key(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Profile of the authenticated user.
///
/// Served from a per-user cache for up to 60 seconds and limited to 10 requests
/// per minute per client address.
///
/// ## Responses:
/// - `200 OK`: `UserResponse`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `429 Too Many Requests`: the client exceeded its budget.
#[get("/me")]
pub async fn me(
    req: HttpRequest,
    user: AuthenticatedUser,
    cache: web::Data<ProfileCache>,
    limiter: web::Data<RateLimiter>,
) -> Result<impl Responder, AppError> {
    let client = client_key(&req);
    if !limiter.check(&client) {
        log::warn!("Rate limit exceeded for {} on /users/me", client);
        return Err(AppError::TooManyRequests(
            "The request limit has been exceeded. Please try again later.".into(),
        ));
    }

    if let Some(profile) = cache.get(user.id) {
        return Ok(HttpResponse::Ok().json(profile));
    }

    let profile = UserResponse::from(&*user);
    cache.insert(profile.clone());
    Ok(HttpResponse::Ok().json(profile))
}

/// Sets the avatar URL of the authenticated admin.
#[patch("/avatar")]
pub async fn update_avatar(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    cache: web::Data<ProfileCache>,
    body: web::Json<AvatarUpdate>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let updated = users::update_avatar(&pool, admin.id, &body.avatar_url).await?;
    cache.invalidate(updated.id);

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}

/// Open to everyone, with or without a token.
#[get("/public")]
pub async fn read_public() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "Public!" }))
}

#[get("/admin")]
pub async fn read_admin(admin: AdminUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": format!("Greetings, {}! This is admin route", admin.username)
    }))
}
