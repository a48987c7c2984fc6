//! Process configuration read from environment variables.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is not valid: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("{0} must be set when KIDSTOCK_STORE=postgres")]
    Missing(&'static str),
}

/// Which [`EntityStore`](crate::store::EntityStore) backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    /// Upsert the default clothing catalog at startup.
    pub seed_categories: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("KIDSTOCK_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "KIDSTOCK_BIND_ADDR",
                message: e.to_string(),
            })?;

        let store = match lookup("KIDSTOCK_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("memory") => StoreBackend::Memory,
            Some("postgres") => {
                let database_url = lookup("DATABASE_URL")
                    .filter(|url| !url.trim().is_empty())
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?;
                let max_connections = match lookup("KIDSTOCK_DB_MAX_CONNECTIONS") {
                    None => DEFAULT_DB_MAX_CONNECTIONS,
                    Some(raw) => raw
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| ConfigError::Invalid {
                            key: "KIDSTOCK_DB_MAX_CONNECTIONS",
                            message: format!("expected a positive integer, got {raw:?}"),
                        })?,
                };
                StoreBackend::Postgres {
                    database_url,
                    max_connections,
                }
            }
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "KIDSTOCK_STORE",
                    message: format!("expected `memory` or `postgres`, got {other:?}"),
                });
            }
        };

        let seed_categories = match lookup("KIDSTOCK_SEED_CATEGORIES") {
            None => true,
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "KIDSTOCK_SEED_CATEGORIES",
                message: format!("expected true/false, got {raw:?}"),
            })?,
        };

        Ok(Self {
            bind_addr,
            store,
            seed_categories,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
