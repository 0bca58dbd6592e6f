//! Process configuration loaded from the environment (and `.env` when present).

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use storefront_auth::TokenIssuer;
use storefront_core::pagination::DEFAULT_PER_PAGE;
use storefront_observability::LogFormat;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}='{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub server_host: IpAddr,
    pub server_port: u16,
    /// Absent means the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,
    pub jwt_refresh_ttl_secs: i64,
    pub log_format: LogFormat,
    pub default_page_size: u32,
    /// Accounts registered with one of these emails get the admin flag.
    pub admin_emails: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server_host: IpAddr::from([127, 0, 0, 1]),
            server_port: 8080,
            database_url: None,
            database_max_connections: 5,
            jwt_secret: Self::DEV_JWT_SECRET.to_string(),
            jwt_access_ttl_secs: TokenIssuer::DEFAULT_ACCESS_TTL_SECS,
            jwt_refresh_ttl_secs: TokenIssuer::DEFAULT_REFRESH_TTL_SECS,
            log_format: LogFormat::Json,
            default_page_size: DEFAULT_PER_PAGE,
            admin_emails: Vec::new(),
        }
    }
}

impl ApiConfig {
    pub const DEV_JWT_SECRET: &'static str = "dev-secret";

    /// Load `.env` (if any), then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source; unset or blank variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let server_host = match get("SERVER_HOST") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("SERVER_HOST", &v, e))?,
            None => defaults.server_host,
        };
        let server_port = parse_or("SERVER_PORT", get("SERVER_PORT"), defaults.server_port)?;
        let database_max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            get("DATABASE_MAX_CONNECTIONS"),
            defaults.database_max_connections,
        )?;
        let jwt_access_ttl_secs = ttl_secs(
            "JWT_ACCESS_TTL_SECS",
            get("JWT_ACCESS_TTL_SECS"),
            defaults.jwt_access_ttl_secs,
        )?;
        let jwt_refresh_ttl_secs = ttl_secs(
            "JWT_REFRESH_TTL_SECS",
            get("JWT_REFRESH_TTL_SECS"),
            defaults.jwt_refresh_ttl_secs,
        )?;
        let log_format = match get("LOG_FORMAT") {
            Some(v) => v.parse().map_err(|e| ConfigError::invalid("LOG_FORMAT", &v, e))?,
            None => defaults.log_format,
        };
        let default_page_size = parse_or("DEFAULT_PAGE_SIZE", get("DEFAULT_PAGE_SIZE"), defaults.default_page_size)?;
        if default_page_size == 0 {
            return Err(ConfigError::invalid("DEFAULT_PAGE_SIZE", "0", "must be at least 1"));
        }

        let admin_emails = get("ADMIN_EMAILS")
            .map(|v| {
                v.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server_host,
            server_port,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            jwt_secret: get("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_access_ttl_secs,
            jwt_refresh_ttl_secs,
            log_format,
            default_page_size,
            admin_emails,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == Self::DEV_JWT_SECRET
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v.trim().parse().map_err(|e| ConfigError::invalid(var, &v, e)),
        None => Ok(default),
    }
}

/// Token lifetime in seconds, between 1 and [`TokenIssuer::MAX_TTL_SECS`].
fn ttl_secs(var: &'static str, raw: Option<String>, default: i64) -> Result<i64, ConfigError> {
    let value = parse_or(var, raw, default)?;
    if value <= 0 {
        return Err(ConfigError::invalid(var, &value.to_string(), "must be positive"));
    }
    if value > TokenIssuer::MAX_TTL_SECS {
        return Err(ConfigError::invalid(
            var,
            &value.to_string(),
            format!("must not exceed {} seconds", TokenIssuer::MAX_TTL_SECS),
        ));
    }
    Ok(value)
}
