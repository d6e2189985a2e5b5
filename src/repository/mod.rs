//! Database access for users and contacts.
//!
//! Every function takes the pool explicitly and binds all user input as query
//! parameters. Contact queries always include the owner's id, so one user can
//! never read or change another user's records.

pub mod contacts;
pub mod users;
