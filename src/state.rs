use actix_web::web;
use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::Config;
use crate::error::AppError;
use crate::services::{Mailer, ProfileCache, RateLimiter};

/// Requests per minute a single client may make to `/api/users/me`.
pub const PROFILE_REQUESTS_PER_MINUTE: u32 = 10;

/// Shared application data, built once and cloned into every worker.
///
/// Each field is a `web::Data` (an `Arc`), so the profile cache and the rate
/// limiter are shared across workers instead of being created per worker.
#[derive(Clone)]
pub struct AppState {
    pub pool: web::Data<PgPool>,
    pub tokens: web::Data<TokenService>,
    pub mailer: web::Data<Mailer>,
    pub profile_cache: web::Data<ProfileCache>,
    pub rate_limiter: web::Data<RateLimiter>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            pool: web::Data::new(pool),
            tokens: web::Data::new(TokenService::from_config(config)),
            mailer: web::Data::new(Mailer::new(&config.mail)?),
            profile_cache: web::Data::new(ProfileCache::default()),
            rate_limiter: web::Data::new(RateLimiter::per_minute(PROFILE_REQUESTS_PER_MINUTE)),
        })
    }

    /// Registers every piece of shared data on an `App`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.pool.clone())
            .app_data(self.tokens.clone())
            .app_data(self.mailer.clone())
            .app_data(self.profile_cache.clone())
            .app_data(self.rate_limiter.clone());
    }
}
