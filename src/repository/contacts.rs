use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Contact, ContactFilter, ContactUpdate};

const CONTACT_COLUMNS: &str = "id, first_name, second_name, email, phone_number, birthday, \
                               additional_data, user_id, created_at, updated_at";

/// One page of the owner's contacts, oldest first, narrowed by `filter`.
pub async fn list(
    pool: &PgPool,
    user_id: i32,
    filter: ContactFilter<'_>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Contact>, AppError> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
    query.push(CONTACT_COLUMNS);
    query.push(" FROM contacts WHERE user_id = ");
    query.push_bind(user_id);

    for (column, value) in [
        ("first_name", filter.first_name),
        ("second_name", filter.second_name),
        ("email", filter.email),
    ] {
        if let Some(value) = value {
            query.push(format!(" AND {} ILIKE ", column));
            query.push_bind(like_pattern(value));
        }
    }

    query.push(" ORDER BY created_at, id OFFSET ");
    query.push_bind(skip);
    query.push(" LIMIT ");
    query.push_bind(limit);

    Ok(query.build_query_as::<Contact>().fetch_all(pool).await?)
}

/// Owner's contacts that have a birthday set; the window check happens in `Contact`.
pub async fn list_with_birthdays(pool: &PgPool, user_id: i32) -> Result<Vec<Contact>, AppError> {
    let sql = format!(
        "SELECT {} FROM contacts WHERE user_id = $1 AND birthday IS NOT NULL ORDER BY birthday",
        CONTACT_COLUMNS
    );
    Ok(sqlx::query_as::<_, Contact>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?)
}

pub async fn get(pool: &PgPool, contact_id: Uuid, user_id: i32) -> Result<Option<Contact>, AppError> {
    let sql = format!(
        "SELECT {} FROM contacts WHERE id = $1 AND user_id = $2",
        CONTACT_COLUMNS
    );
    Ok(sqlx::query_as::<_, Contact>(&sql)
        .bind(contact_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?)
}

pub async fn create(pool: &PgPool, contact: &Contact) -> Result<Contact, AppError> {
    let sql = format!(
        "INSERT INTO contacts \
         (id, first_name, second_name, email, phone_number, birthday, additional_data, user_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {}",
        CONTACT_COLUMNS
    );
    Ok(sqlx::query_as::<_, Contact>(&sql)
        .bind(contact.id)
        .bind(&contact.first_name)
        .bind(&contact.second_name)
        .bind(&contact.email)
        .bind(&contact.phone_number)
        .bind(contact.birthday)
        .bind(&contact.additional_data)
        .bind(contact.user_id)
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .fetch_one(pool)
        .await?)
}

/// Applies the fields present in `update`; `None` when the contact is missing or
/// belongs to someone else.
pub async fn update(
    pool: &PgPool,
    contact_id: Uuid,
    user_id: i32,
    update: &ContactUpdate,
) -> Result<Option<Contact>, AppError> {
    let sql = format!(
        "UPDATE contacts SET \
         first_name = COALESCE($1, first_name), \
         second_name = COALESCE($2, second_name), \
         email = COALESCE($3, email), \
         phone_number = COALESCE($4, phone_number), \
         birthday = COALESCE($5, birthday), \
         additional_data = COALESCE($6, additional_data), \
         updated_at = NOW() \
         WHERE id = $7 AND user_id = $8 \
         RETURNING {}",
        CONTACT_COLUMNS
    );
    Ok(sqlx::query_as::<_, Contact>(&sql)
        .bind(&update.first_name)
        .bind(&update.second_name)
        .bind(&update.email)
        .bind(&update.phone_number)
        .bind(update.birthday)
        .bind(&update.additional_data)
        .bind(contact_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?)
}

/// Deletes and returns the contact; `None` when it is missing or not owned by `user_id`.
pub async fn delete(pool: &PgPool, contact_id: Uuid, user_id: i32) -> Result<Option<Contact>, AppError> {
    let sql = format!(
        "DELETE FROM contacts WHERE id = $1 AND user_id = $2 RETURNING {}",
        CONTACT_COLUMNS
    );
    Ok(sqlx::query_as::<_, Contact>(&sql)
        .bind(contact_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?)
}

/// `%value%` with LIKE metacharacters escaped.
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
