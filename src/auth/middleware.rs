use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{Claims, TokenService, TokenType};
use crate::error::AppError;

/// Paths reachable without a bearer token. Entries ending in `/` match as prefixes.
const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/api/healthchecker",
    "/api/auth/",
    "/api/users/public",
];

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|public| {
        if public.ends_with('/') {
            path.starts_with(public)
        } else {
            path == *public
        }
    })
}

/// Rejects requests to protected routes unless they carry a valid access token.
///
/// On success the decoded `Claims` are stored in the request extensions, where the
/// `AuthenticatedUser` extractor picks them up. Rejections are answered here, before
/// any handler (and therefore any database write) runs.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public_path(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        match authenticate(&req) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(app_err) => {
                log::debug!("Rejected {} {}: {}", req.method(), req.path(), app_err);
                let (request, _payload) = req.into_parts();
                let response = app_err.error_response().map_into_right_body();
                Box::pin(async move { Ok(ServiceResponse::new(request, response)) })
            }
        }
    }
}

fn authenticate(req: &ServiceRequest) -> Result<Claims, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::InternalServerError("TokenService is not configured".into()))?;

    tokens.verify(token.trim(), TokenType::Access)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/api/healthchecker"));
        assert!(is_public_path("/api/auth/login"));
        assert!(is_public_path("/api/auth/confirmed_email/abc"));
        assert!(is_public_path("/api/users/public"));

        assert!(!is_public_path("/api/users/me"));
        assert!(!is_public_path("/api/users/publicity"));
        assert!(!is_public_path("/api/contacts"));
        assert!(!is_public_path("/api/authx"));
    }
}
