use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Contact, ContactInput, ContactQuery, ContactUpdate},
    repository::contacts,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

fn contact_not_found() -> AppError {
    AppError::NotFound("Contact not found".into())
}

/// Lists the authenticated user's contacts.
///
/// ## Query Parameters:
/// - `skip` (optional, default 0): number of contacts to skip.
/// - `limit` (optional, default 10, 1 to 100): page size.
/// - `first_name`, `second_name`, `email` (optional): case-insensitive substring
///   filters; when several are given, all of them must match.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Contact`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: `skip`/`limit` out of range.
#[get("")]
pub async fn get_contacts(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    query: web::Query<ContactQuery>,
) -> Result<impl Responder, AppError> {
    query.validate()?;

    let contacts = contacts::list(&pool, user.id, query.filter(), query.skip(), query.limit()).await?;
    Ok(HttpResponse::Ok().json(contacts))
}

/// Contacts whose birthday falls within the next seven days, today included.
#[get("/birthdays")]
pub async fn get_upcoming_birthdays(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let today = Utc::now().date_naive();
    let upcoming: Vec<Contact> = contacts::list_with_birthdays(&pool, user.id)
        .await?
        .into_iter()
        .filter(|contact| contact.has_upcoming_birthday(today))
        .collect();

    Ok(HttpResponse::Ok().json(upcoming))
}

/// Retrieves one contact. Contacts of other users are reported as not found.
#[get("/{id}")]
pub async fn get_contact(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    contact_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let contact = contacts::get(&pool, contact_id.into_inner(), user.id)
        .await?
        .ok_or_else(contact_not_found)?;

    Ok(HttpResponse::Ok().json(contact))
}

/// Creates a contact owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Contact`.
/// - `400 Bad Request`: malformed JSON or missing fields.
/// - `422 Unprocessable Entity`: validation failed.
#[post("")]
pub async fn create_contact(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    contact_data: web::Json<ContactInput>,
) -> Result<impl Responder, AppError> {
    contact_data.validate()?;

    let contact = Contact::new(contact_data.into_inner(), user.id);
    let created = contacts::create(&pool, &contact).await?;

    Ok(HttpResponse::Created().json(created))
}

/// Updates the fields present in the body.
#[put("/{id}")]
pub async fn update_contact(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    contact_id: web::Path<Uuid>,
    contact_data: web::Json<ContactUpdate>,
) -> Result<impl Responder, AppError> {
    contact_data.validate()?;

    let updated = contacts::update(&pool, contact_id.into_inner(), user.id, &contact_data)
        .await?
        .ok_or_else(contact_not_found)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a contact and returns it.
#[delete("/{id}")]
pub async fn delete_contact(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    contact_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let removed = contacts::delete(&pool, contact_id.into_inner(), user.id)
        .await?
        .ok_or_else(contact_not_found)?;

    Ok(HttpResponse::Ok().json(removed))
}
