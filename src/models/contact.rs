use chrono::{DateTime, Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Contacts whose next birthday is at most this many days away count as upcoming.
pub const BIRTHDAY_WINDOW_DAYS: i64 = 7;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

lazy_static! {
    // Optional leading '+', then 7 to 12 digits (fits the 13 character column).
    static ref PHONE_REGEX: regex::Regex = regex::Regex::new(r"^\+?[0-9]{7,12}$").unwrap();
}

/// Input structure for creating a contact.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ContactInput {
    #[validate(length(min = 1, max = 30))]
    pub first_name: String,
    #[validate(length(min = 1, max = 30))]
    pub second_name: String,
    #[validate(email, length(max = 100))]
    pub email: String,
    #[validate(regex(path = "PHONE_REGEX", message = "Phone number must be 7-12 digits, optionally prefixed with '+'"))]
    pub phone_number: String,
    pub birthday: Option<NaiveDate>,
    #[validate(length(max = 250))]
    pub additional_data: Option<String>,
}

/// Partial update: only the fields present in the body change.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct ContactUpdate {
    #[validate(length(min = 1, max = 30))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub second_name: Option<String>,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(regex(path = "PHONE_REGEX", message = "Phone number must be 7-12 digits, optionally prefixed with '+'"))]
    pub phone_number: Option<String>,
    pub birthday: Option<NaiveDate>,
    #[validate(length(max = 250))]
    pub additional_data: Option<String>,
}

/// A contact as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub first_name: String,
    pub second_name: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: Option<NaiveDate>,
    pub additional_data: Option<String>,
    /// Owner of the contact.
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(input: ContactInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: input.first_name,
            second_name: input.second_name,
            email: input.email,
            phone_number: input.phone_number,
            birthday: input.birthday,
            additional_data: input.additional_data,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this contact's next birthday falls within `BIRTHDAY_WINDOW_DAYS` of `today`.
    pub fn has_upcoming_birthday(&self, today: NaiveDate) -> bool {
        self.birthday
            .and_then(|birthday| next_birthday(birthday, today))
            .map(|next| (next - today).num_days() <= BIRTHDAY_WINDOW_DAYS)
            .unwrap_or(false)
    }
}

/// Query parameters for listing contacts.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct ContactQuery {
    #[validate(range(min = 0))]
    pub skip: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub email: Option<String>,
}

impl ContactQuery {
    pub fn skip(&self) -> i64 {
        self.skip.unwrap_or(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }

    /// Blank filters are treated as absent.
    pub fn filter(&self) -> ContactFilter<'_> {
        fn non_blank(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        ContactFilter {
            first_name: non_blank(&self.first_name),
            second_name: non_blank(&self.second_name),
            email: non_blank(&self.email),
        }
    }
}

/// Case-insensitive substring filters; every present filter must match.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ContactFilter<'a> {
    pub first_name: Option<&'a str>,
    pub second_name: Option<&'a str>,
    pub email: Option<&'a str>,
}

impl ContactFilter<'_> {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.second_name.is_none() && self.email.is_none()
    }
}

/// The first anniversary of `birthday` on or after `today`.
///
/// A February 29 birthday is celebrated on February 28 in non-leap years.
pub fn next_birthday(birthday: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = anniversary(birthday, today.year())?;
    if this_year >= today {
        Some(this_year)
    } else {
        anniversary(birthday, today.year() + 1)
    }
}

fn anniversary(birthday: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day() - 1))
}
