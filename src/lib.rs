#![doc = "The `contactbook` library crate."]
#![doc = ""]
#![doc = "Authentication (JWT access/refresh/email tokens, bcrypt passwords), user profiles,"]
#![doc = "per-user contact books, and the routing and error handling that expose them over HTTP."]
#![doc = "Used by the `contactbook` server binary and the `migrate` binary."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use error::AppError;
pub use state::AppState;

/// Schema migrations from `migrations/`, embedded at compile time.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
