use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/eventhub";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    /// `RUST_ENV=production`: HSTS and `Secure` cookies.
    pub production: bool,
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            bind_addr: parse_var("BIND_ADDR", default_bind_addr())?,
            jwt_secret,
            session_ttl_hours: session_ttl_hours(parse_var(
                "SESSION_TTL_HOURS",
                DEFAULT_SESSION_TTL_HOURS,
            )?)?,
            production: is_production(env::var("RUST_ENV").ok().as_deref()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| cors::DEFAULT_ALLOWED_ORIGINS.to_string()),
        })
    }

    /// Defaults for everything but the signing secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: default_bind_addr(),
            jwt_secret: jwt_secret.into(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            production: false,
            cors_allowed_origins: cors::DEFAULT_ALLOWED_ORIGINS.to_string(),
        }
    }
}

fn is_production(rust_env: Option<&str>) -> bool {
    rust_env.is_some_and(|v| v.eq_ignore_ascii_case("production"))
}

/// Between one hour and a year.
fn session_ttl_hours(hours: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ConfigError::Invalid {
            name: "SESSION_TTL_HOURS",
            value: hours.to_string(),
        })
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3001))
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_production() {
        assert!(is_production(Some("production")));
        assert!(is_production(Some("PRODUCTION")));
        assert!(!is_production(Some("development")));
        assert!(!is_production(None));
    }

    #[test]
    fn test_with_secret_defaults() {
        let config = Config::with_secret("s3cret");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.bind_addr.port(), 3001);
        assert_eq!(config.session_ttl_hours, 24);
        assert!(!config.production);
    }

    #[test]
    fn test_session_ttl_bounds() {
        assert_eq!(session_ttl_hours(1).unwrap(), 1);
        assert_eq!(session_ttl_hours(8760).unwrap(), 8760);
        assert!(session_ttl_hours(0).is_err());
        assert!(session_ttl_hours(-5).is_err());
        assert!(matches!(
            session_ttl_hours(i64::MAX),
            Err(ConfigError::Invalid { name: "SESSION_TTL_HOURS", .. })
        ));
    }

    #[test]
    fn test_parse_var_uses_default_when_unset() {
        let value: u32 = parse_var("EVENTHUB_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
