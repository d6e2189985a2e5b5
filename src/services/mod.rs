pub mod cache;
pub mod mail;
pub mod rate_limit;

pub use cache::ProfileCache;
pub use mail::{EmailMessage, MailTemplate, Mailer};
pub use rate_limit::RateLimiter;
