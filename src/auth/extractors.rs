use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::ops::Deref;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::{User, UserRole};
use crate::repository::users;

/// The user behind the access token of the current request.
///
/// Intended for routes behind `AuthMiddleware`, which validates the token and stores
/// its `Claims` in the request extensions. The user is then loaded from the database,
/// so a token that outlives its account is rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl Deref for AuthenticatedUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move {
            let claims = claims.ok_or_else(|| {
                AppError::Unauthorized("Not authenticated. Ensure AuthMiddleware is active.".into())
            })?;
            let pool = pool
                .ok_or_else(|| AppError::InternalServerError("Database pool is not configured".into()))?;

            let user = users::find_by_username(&pool, &claims.sub)
                .await?
                .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

            Ok(AuthenticatedUser(user))
        })
    }
}

/// An `AuthenticatedUser` whose role is `admin`; anyone else gets 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl Deref for AdminUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let user = AuthenticatedUser::from_request(req, payload);

        Box::pin(async move {
            let AuthenticatedUser(user) = user.await?;
            if user.role != UserRole::Admin {
                return Err(AppError::Forbidden("No access rights".into()).into());
            }
            Ok(AdminUser(user))
        })
    }
}
