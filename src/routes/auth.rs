use crate::{
    auth::{
        hash_password, verify_password, LoginRequest, RefreshTokenRequest, RegisterRequest,
        RegisterResponse, RequestEmail, ResetPasswordRequest, TokenResponse, TokenService,
        TokenType,
    },
    error::AppError,
    models::{gravatar_url, NewUser, User},
    repository::users,
    routes::base_url,
    services::{MailTemplate, Mailer},
};
use actix_web::{get, post, web, Either, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

const EMAIL_SENT_MESSAGE: &str = "If this email exists, a confirmation link has been sent.";
const RESET_SENT_MESSAGE: &str = "If this email exists, a reset link has been sent.";

/// Issues an email token for `user` and mails the matching link in the background.
fn queue_mail(
    req: &HttpRequest,
    tokens: &TokenService,
    mailer: &Mailer,
    user: &User,
    template: MailTemplate,
) -> Result<(), AppError> {
    let token = tokens.create_email_token(&user.email)?;
    let link = template.link(&base_url(req), &token);
    mailer.send_in_background(mailer.compose(template, &user.email, &user.username, &link));
    Ok(())
}

/// Register a new user
///
/// Creates an unconfirmed account and mails a confirmation link.
///
/// ## Responses:
/// - `201 Created`: `{username, email, created_at}`.
/// - `400 Bad Request`: missing fields or malformed JSON.
/// - `409 Conflict`: the username or the email is already taken.
/// - `422 Unprocessable Entity`: validation failed.
#[post("/register")]
pub async fn register(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    mailer: web::Data<Mailer>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let register_data = register_data.into_inner();

    if users::find_by_email(&pool, &register_data.email).await?.is_some()
        || users::find_by_username(&pool, &register_data.username).await?.is_some()
    {
        return Err(AppError::Conflict("Account already exists".into()));
    }

    let user = users::create(
        &pool,
        &NewUser {
            avatar: Some(gravatar_url(&register_data.email)),
            password_hash: hash_password(&register_data.password)?,
            username: register_data.username,
            email: register_data.email,
        },
    )
    .await?;
    log::info!("Registered user {} (id {})", user.username, user.id);

    queue_mail(&req, &tokens, &mailer, &user, MailTemplate::VerifyEmail)?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    }))
}

/// Login user
///
/// Accepts `username` and `password` as JSON or as an urlencoded form and returns an
/// access/refresh token pair. The refresh token is stored so it can be checked later.
///
/// ## Responses:
/// - `200 OK`: `{access_token, refresh_token, token_type: "bearer"}`.
/// - `401 Unauthorized`: unknown username, wrong password, or unconfirmed email.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    body: Either<web::Json<LoginRequest>, web::Form<LoginRequest>>,
) -> Result<impl Responder, AppError> {
    let login_data = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let user = users::find_by_username(&pool, &login_data.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid username".into()))?;

    if !verify_password(&login_data.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid password".into()));
    }
    if !user.confirmed {
        return Err(AppError::Unauthorized("Email wasn't confirmed".into()));
    }

    let access_token = tokens.create_access_token(&user.username)?;
    let new_refresh_token = tokens.create_refresh_token(&user.username)?;
    users::set_refresh_token(&pool, user.id, Some(&new_refresh_token)).await?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(access_token, new_refresh_token)))
}

/// Exchange a refresh token for a new access token
///
/// The refresh token must be valid and still be the one stored for its user;
/// it is returned unchanged.
#[post("/refresh-token")]
pub async fn refresh_token(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    body: web::Json<RefreshTokenRequest>,
) -> Result<impl Responder, AppError> {
    let invalid = || AppError::Unauthorized("Invalid or expired refresh token".into());

    let claims = tokens
        .verify(&body.refresh_token, TokenType::Refresh)
        .map_err(|_| invalid())?;
    let user = users::find_by_refresh_token(&pool, &claims.sub, &body.refresh_token)
        .await?
        .ok_or_else(invalid)?;

    let access_token = tokens.create_access_token(&user.username)?;
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(
        access_token,
        body.into_inner().refresh_token,
    )))
}

/// Re-send the confirmation link
///
/// The answer does not reveal whether the address is registered.
#[post("/request_email")]
pub async fn request_email(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    mailer: web::Data<Mailer>,
    body: web::Json<RequestEmail>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    match users::find_by_email(&pool, &body.email).await? {
        Some(user) if user.confirmed => {
            Ok(HttpResponse::Ok().json(json!({ "message": "Your email is already confirmed." })))
        }
        Some(user) => {
            queue_mail(&req, &tokens, &mailer, &user, MailTemplate::VerifyEmail)?;
            Ok(HttpResponse::Ok().json(json!({ "message": EMAIL_SENT_MESSAGE })))
        }
        None => Ok(HttpResponse::Ok().json(json!({ "message": EMAIL_SENT_MESSAGE }))),
    }
}

/// Confirm an email address with the token from the confirmation link.
#[get("/confirmed_email/{token}")]
pub async fn confirmed_email(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    token: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let verification_error = || AppError::BadRequest("Verification error".into());

    let email = tokens.email_from_token(&token).ok_or_else(verification_error)?;
    let user = users::find_by_email(&pool, &email)
        .await?
        .ok_or_else(verification_error)?;

    if user.confirmed {
        return Err(AppError::BadRequest(
            "Your email has already been confirmed".into(),
        ));
    }

    users::confirm_email(&pool, &user.email).await?;
    log::info!("Confirmed email for user {}", user.username);
    Ok(HttpResponse::Ok().json(json!({ "message": "Email confirmed!" })))
}

/// Mail a password reset link. The answer is the same whether or not the address exists.
#[post("/request_password_reset")]
pub async fn request_password_reset(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    mailer: web::Data<Mailer>,
    body: web::Json<RequestEmail>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    if let Some(user) = users::find_by_email(&pool, &body.email).await? {
        queue_mail(&req, &tokens, &mailer, &user, MailTemplate::ResetPassword)?;
    }
    Ok(HttpResponse::Ok().json(json!({ "message": RESET_SENT_MESSAGE })))
}

/// Set a new password using the token from the reset link.
#[post("/reset_password")]
pub async fn reset_password(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<impl Responder, AppError> {
    let verification_error = || AppError::BadRequest("Verification error".into());

    let email = tokens.email_from_token(&body.token).ok_or_else(verification_error)?;
    body.validate()?;

    let user = users::find_by_email(&pool, &email)
        .await?
        .ok_or_else(verification_error)?;

    let password_hash = hash_password(&body.password)?;
    users::update_password(&pool, &user.email, &password_hash).await?;
    log::info!("Password reset for user {}", user.username);

    Ok(HttpResponse::Ok().json(json!({ "message": "Password reset confirmed!" })))
}
