//! Service Configuration
//!
//! All configuration values are loaded from environment variables once at
//! startup. No hardcoded secrets.

use crate::error::ConfigError;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// Service configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Secret key for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// Token lifetime in seconds (from TOKEN_TTL_SECONDS env var)
    pub token_ttl: i64,

    /// JWT issuer (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// JWT audience (from JWT_AUDIENCE env var)
    pub jwt_audience: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// PostgreSQL connection string (from DATABASE_URL env var).
    /// `None` selects the in-memory backend.
    pub database_url: Option<String>,

    /// Connection pool size (from DATABASE_MAX_CONNECTIONS env var)
    pub database_max_connections: u32,

    /// Address to listen on (from LISTEN_ADDR env var)
    pub listen_addr: SocketAddr,

    /// Default log filter (from LOG_LEVEL env var)
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,

            token_ttl: parse_var("TOKEN_TTL_SECONDS", 300)?, // 5 minutes default

            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "item-keeper".to_string()),

            jwt_audience: env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "item-keeper-api".to_string()),

            argon2_memory_cost: parse_var("ARGON2_MEMORY_COST", 65536)?, // 64 MiB

            argon2_time_cost: parse_var("ARGON2_TIME_COST", 3)?,

            argon2_parallelism: parse_var("ARGON2_PARALLELISM", 4)?,

            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),

            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,

            listen_addr: parse_var("LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                "must be at least 32 characters",
            ));
        }

        if self.token_ttl <= 0 {
            return Err(ConfigError::invalid("TOKEN_TTL_SECONDS", "must be positive"));
        }

        if argon2::Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            None,
        )
        .is_err()
        {
            return Err(ConfigError::invalid(
                "ARGON2_MEMORY_COST",
                "argon2 parameters out of range",
            ));
        }

        if self.database_max_connections == 0 {
            return Err(ConfigError::invalid(
                "DATABASE_MAX_CONNECTIONS",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(var, format!("cannot parse {raw:?}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: "a".repeat(32),
        token_ttl: 300,
        jwt_issuer: "test".to_string(),
        jwt_audience: "test".to_string(),
        // Cheap parameters keep the test suite fast
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        database_url: None,
        database_max_connections: 1,
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        log_level: "debug".to_string(),
    }
}
