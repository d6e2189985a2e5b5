use std::env;
use std::fmt;

/// Runtime configuration, read from the process environment (and `.env` via `dotenv`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_minutes: i64,
    pub cors_origins: Vec<String>,
    pub run_migrations: bool,
    pub mail: MailConfig,
}

/// Outbound mail settings. Without `api_url` messages are only logged.
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub from: String,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_port: parse("SERVER_PORT", or_default("SERVER_PORT", "8080"))?,
            server_host: or_default("SERVER_HOST", "127.0.0.1"),
            jwt_secret: required("JWT_SECRET")?,
            access_token_expire_minutes: parse(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
            )?,
            refresh_token_expire_minutes: parse(
                "REFRESH_TOKEN_EXPIRE_MINUTES",
                or_default("REFRESH_TOKEN_EXPIRE_MINUTES", "30"),
            )?,
            cors_origins: or_default("CORS_ORIGINS", "http://localhost:3000")
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            run_migrations: parse("RUN_MIGRATIONS", or_default("RUN_MIGRATIONS", "false"))?,
            mail: MailConfig {
                from: or_default("MAIL_FROM", "Contactbook <no-reply@contactbook.local>"),
                api_url: lookup("MAIL_API_URL").filter(|url| !url.is_empty()),
                api_key: lookup("MAIL_API_KEY").filter(|key| !key.is_empty()),
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.access_token_expire_minutes, 30);
        assert_eq!(config.refresh_token_expire_minutes, 30);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
        assert!(!config.run_migrations);
        assert!(config.mail.api_url.is_none());
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("RUN_MIGRATIONS", "true"),
            ("MAIL_API_URL", "https://mail.test/send"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(config.run_migrations);
        assert_eq!(config.mail.api_url.as_deref(), Some("https://mail.test/send"));
    }

    #[test]
    fn test_config_missing_and_invalid() {
        let missing = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://test")]));
        assert_eq!(missing.unwrap_err(), ConfigError::Missing("JWT_SECRET"));

        let invalid = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "eighty"),
        ]));
        assert_eq!(
            invalid.unwrap_err(),
            ConfigError::Invalid {
                key: "SERVER_PORT",
                value: "eighty".into()
            }
        );
    }
}
