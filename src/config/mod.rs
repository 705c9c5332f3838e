//! Environment configuration.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::SocketAddr;

/// Default Redis URL used when `REDIS_URL` is unset.
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Default bind address for the HTTP server.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Process-wide, environment-sourced configuration.
///
/// Loaded once at startup via [`Config::from_env`] and held by the
/// [`crate::lifecycle::AppContext`] — never re-read per request.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres user.
    pub db_user: String,
    /// Postgres password.
    pub db_password: String,
    /// Postgres host.
    pub db_host: String,
    /// Postgres port.
    pub db_port: u16,
    /// Postgres database name.
    pub db_name: String,
    /// Connection pool size.
    pub db_pool_size: u32,
    /// Maximum overflow connections beyond `db_pool_size`.
    pub db_max_overflow: u32,
    /// Seconds to wait for a pooled connection before failing.
    pub db_pool_timeout_secs: u64,
    /// Seconds before a pooled connection is recycled.
    pub db_pool_recycle_secs: u64,

    /// API key for the Gemini embedding provider.
    pub gemini_api_key: String,

    /// Redis connection URL backing the L2 cache.
    pub redis_url: String,

    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
}

impl Config {
    const ENV_DB_USER: &'static str = "MAIN_DB_USER";
    const ENV_DB_PW: &'static str = "MAIN_DB_PW";
    const ENV_DB_HOST: &'static str = "MAIN_DB_HOST";
    const ENV_DB_PORT: &'static str = "MAIN_DB_PORT";
    const ENV_DB_NAME: &'static str = "MAIN_DB_NAME";
    const ENV_DB_POOL_SIZE: &'static str = "MAIN_DB_POOL_SIZE";
    const ENV_DB_MAX_OVERFLOW: &'static str = "MAIN_DB_MAX_OVERFLOW";
    const ENV_DB_POOL_TIMEOUT: &'static str = "MAIN_DB_POOL_TIMEOUT";
    const ENV_DB_POOL_RECYCLE: &'static str = "MAIN_DB_POOL_RECYCLE";
    const ENV_GEMINI_API_KEY: &'static str = "GEMINI_API_KEY";
    const ENV_REDIS_URL: &'static str = "REDIS_URL";
    const ENV_BIND_ADDR: &'static str = "BIND_ADDR";

    /// Loads configuration from the process environment, failing fast on any
    /// missing required variable or malformed value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_user = Self::require(Self::ENV_DB_USER)?;
        let db_password = Self::require(Self::ENV_DB_PW)?;
        let db_host = Self::require(Self::ENV_DB_HOST)?;
        let db_port = Self::parse_env_or(Self::ENV_DB_PORT, 5432)?;
        let db_name = Self::require(Self::ENV_DB_NAME)?;

        let db_pool_size = Self::parse_env_or(Self::ENV_DB_POOL_SIZE, 5)?;
        let db_max_overflow = Self::parse_env_or(Self::ENV_DB_MAX_OVERFLOW, 10)?;
        let db_pool_timeout_secs = Self::parse_env_or(Self::ENV_DB_POOL_TIMEOUT, 30)?;
        let db_pool_recycle_secs = Self::parse_env_or(Self::ENV_DB_POOL_RECYCLE, 1800)?;

        let gemini_api_key = Self::require(Self::ENV_GEMINI_API_KEY)?;

        let redis_url =
            env::var(Self::ENV_REDIS_URL).unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());

        let bind_addr_raw =
            env::var(Self::ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_raw
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind_addr_raw,
                source,
            })?;

        Ok(Self {
            db_user,
            db_password,
            db_host,
            db_port,
            db_name,
            db_pool_size,
            db_max_overflow,
            db_pool_timeout_secs,
            db_pool_recycle_secs,
            gemini_api_key,
            redis_url,
            bind_addr,
        })
    }

    fn require(name: &'static str) -> Result<String, ConfigError> {
        env::var(name)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnvVar { name })
    }

    fn parse_env_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr<Err = std::num::ParseIntError>,
    {
        match env::var(name) {
            Ok(value) if !value.is_empty() => {
                value
                    .parse()
                    .map_err(|source| ConfigError::NumberParseError {
                        name,
                        value,
                        source,
                    })
            }
            _ => Ok(default),
        }
    }

    /// Native `postgres://` URL sqlx connects with. The pool is sized from
    /// `db_pool_size` + `db_max_overflow` at the call site, since sqlx has no
    /// notion of "overflow" connections distinct from the base pool size.
    pub fn sqlx_db_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }

    /// Canonical connection-string shape from the upstream service
    /// (`postgresql+asyncpg://user:pw@host:port/name?ssl=require`), kept for
    /// documentation and log messages even though sqlx consumes the native
    /// form from [`Config::sqlx_db_url`].
    pub fn canonical_db_url(&self) -> String {
        format!(
            "postgresql+asyncpg://{}:{}@{}:{}/{}?ssl=require",
            self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }
}
