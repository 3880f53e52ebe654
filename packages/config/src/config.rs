// ABOUTME: Process-wide configuration resolved from the environment
// ABOUTME: Administrator bootstrap identity, server, database, and CLI settings

use std::env;
use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[source] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid session TTL: {0}")]
    InvalidSessionTtl(String),
}

/// Identity used to create the first administrator account
#[derive(Clone, PartialEq)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub admin: AdminBootstrap,
    pub port: u16,
    pub cors_origin: String,
    pub database_path: PathBuf,
    pub session_ttl_hours: i64,
    pub api_url: String,
}

impl Config {
    /// Load `.env` (if present) and resolve configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str, default: &str| match lookup(key) {
            Some(v) => {
                debug!("{} overridden by environment", key);
                v
            }
            None => default.to_string(),
        };

        let admin = AdminBootstrap {
            email: value(OKRDESK_ADMIN_EMAIL, DEFAULT_ADMIN_EMAIL),
            password: value(OKRDESK_ADMIN_PASSWORD, DEFAULT_ADMIN_PASSWORD),
            name: value(OKRDESK_ADMIN_NAME, DEFAULT_ADMIN_NAME),
        };

        let port = match lookup(OKRDESK_API_PORT) {
            Some(raw) => raw.trim().parse::<u16>().map_err(ConfigError::InvalidPort)?,
            None => DEFAULT_API_PORT,
        };

        // Validate port is in valid range
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let session_ttl_hours = match lookup(OKRDESK_SESSION_TTL_HOURS) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => return Err(ConfigError::InvalidSessionTtl(raw)),
            },
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        let database_path = lookup(OKRDESK_DATABASE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(okrdesk_core::database_file);

        Ok(Config {
            admin,
            port,
            cors_origin: value(OKRDESK_CORS_ORIGIN, DEFAULT_CORS_ORIGIN),
            database_path,
            session_ttl_hours,
            api_url: value(OKRDESK_API_URL, DEFAULT_API_URL),
        })
    }
}
