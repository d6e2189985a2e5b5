pub mod auth;
pub mod contacts;
pub mod health;
pub mod users;

use actix_cors::Cors;
use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError, UrlencodedError},
    web, HttpRequest,
};

use crate::auth::AuthMiddleware;
use crate::config::Config;
use crate::error::AppError;

/// Mounts `/health` and the `/api` scope guarded by `AuthMiddleware`.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health).service(
        web::scope("/api")
            .wrap(AuthMiddleware)
            .configure(config),
    );
}

/// Routes below `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    extractor_errors(cfg);
    cfg.service(health::healthchecker)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::refresh_token)
                .service(auth::request_email)
                .service(auth::confirmed_email)
                .service(auth::request_password_reset)
                .service(auth::reset_password),
        )
        .service(
            web::scope("/contacts")
                .service(contacts::get_contacts)
                .service(contacts::get_upcoming_birthdays)
                .service(contacts::create_contact)
                .service(contacts::get_contact)
                .service(contacts::update_contact)
                .service(contacts::delete_contact),
        )
        .service(
            web::scope("/users")
                .service(users::me)
                .service(users::update_avatar)
                .service(users::read_public)
                .service(users::read_admin),
        );
}

/// Extractor failures answer 400 with the usual `{"error": ...}` body.
fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::FormConfig::default().error_handler(form_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));
}

pub fn cors(config: &Config) -> Cors {
    config
        .cors_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query string: {}", err)).into()
}

fn form_error_handler(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid form body: {}", err)).into()
}

fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid path: {}", err)).into()
}

/// Base URL the client used to reach us, for links in outgoing mail.
pub(crate) fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}
