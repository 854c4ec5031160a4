//! Configuration module
//!
//! Loads configuration from environment variables. Loaded once at start-up
//! and passed by value to whatever needs it.

use std::env;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;

/// Signing secret used when `JWT_SECRET` is unset; development only
pub const DEFAULT_JWT_SECRET: &str = "super-secret-key";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Full connection URL; takes precedence over the individual parts
    pub database_url: Option<String>,

    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Secret for signing bearer tokens
    pub jwt_secret: String,

    /// Bearer token lifetime in hours
    pub token_ttl_hours: i64,

    /// Environment (development, production)
    pub environment: String,

    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = get("DATABASE_URL");
        let db_host = get_or("DB_HOST", "localhost");
        let db_port = get_or("DB_PORT", "5432")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DB_PORT"))?;
        let db_user = get_or("DB_USER", "avito");
        let db_password = get_or("DB_PASSWORD", "avito");
        let db_name = get_or("DB_NAME", "avito");

        let database_max_connections = get_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = get_or("HOST", "0.0.0.0");

        let (port_key, port_value) = match get("APP_PORT") {
            Some(v) => ("APP_PORT", v),
            None => ("PORT", get_or("PORT", "8080")),
        };
        let port = port_value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(port_key))?;

        let jwt_secret = get_or("JWT_SECRET", DEFAULT_JWT_SECRET);

        let token_ttl_hours: i64 = get_or("TOKEN_TTL_HOURS", "24")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TOKEN_TTL_HOURS"))?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue("TOKEN_TTL_HOURS"));
        }

        let environment = get_or("ENVIRONMENT", "development");
        let json_logs = get("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"))
            || environment == "production";

        let config = Self {
            database_url,
            db_host,
            db_port,
            db_user,
            db_password,
            db_name,
            database_max_connections,
            host,
            port,
            jwt_secret,
            token_ttl_hours,
            environment,
            json_logs,
        };

        if config.is_production() && config.jwt_secret == DEFAULT_JWT_SECRET {
            return Err(ConfigError::InsecureSecret);
        }

        Ok(config)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Connection options for the pool.
    ///
    /// The parts are passed through unescaped, so credentials may contain
    /// any character.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match &self.database_url {
            Some(url) => PgConnectOptions::from_str(url),
            None => Ok(PgConnectOptions::new()
                .host(&self.db_host)
                .port(self.db_port)
                .username(&self.db_user)
                .password(&self.db_password)
                .database(&self.db_name)),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),

    #[error("JWT_SECRET must be set in production")]
    InsecureSecret,
}
