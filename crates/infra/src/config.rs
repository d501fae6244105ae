//! Configuration loading and representation.
//!
//! Everything is read from environment variables once at startup:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `DATABASE_URL` | unset | Postgres URL; the in-memory store is used when unset |
//! | `DATABASE_MAX_CONNECTIONS` | `5` | pool size |
//! | `HTTP_ADDR` | `0.0.0.0:3001` | HTTP listen address |
//! | `RPC_ADDR` | unset | message-pattern TCP listen address; disabled when unset |

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3001";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key} ({value:?}): {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub rpc_addr: Option<SocketAddr>,
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_addr = parse_addr("HTTP_ADDR", get("HTTP_ADDR").as_deref().unwrap_or(DEFAULT_HTTP_ADDR))?;

        let rpc_addr = get("RPC_ADDR")
            .map(|v| parse_addr("RPC_ADDR", &v))
            .transpose()?;

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => match v.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                Ok(_) => return Err(invalid("DATABASE_MAX_CONNECTIONS", &v, "must be at least 1")),
                Err(e) => return Err(invalid("DATABASE_MAX_CONNECTIONS", &v, e)),
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let database = get("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections,
        });

        Ok(Self {
            http_addr,
            rpc_addr,
            database,
        })
    }
}

fn parse_addr(key: &'static str, value: &str) -> Result<SocketAddr, ConfigError> {
    value.trim().parse().map_err(|e| invalid(key, value, e))
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
