pub mod contact;
pub mod user;

pub use contact::{Contact, ContactFilter, ContactInput, ContactQuery, ContactUpdate};
pub use user::{gravatar_url, AvatarUpdate, NewUser, User, UserResponse, UserRole};
