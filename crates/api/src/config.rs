//! Environment-based configuration, read once at startup.

use thiserror::Error;

use gift_infra::DatabaseConfig;
use gift_observability::LogFormat;
use gift_products::{CatalogPolicy, DEFAULT_RESERVED_KEYWORD};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("LOG_FORMAT: {0}")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database: DatabaseConfig,
    pub policy: CatalogPolicy,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Read `BIND_ADDR`, `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`,
    /// `RESERVED_PRODUCT_KEYWORD` and `LOG_FORMAT` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                    });
                }
            },
            None => DatabaseConfig::DEFAULT_MAX_CONNECTIONS,
        };

        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidLogFormat)?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database: DatabaseConfig {
                url: var("DATABASE_URL"),
                max_connections,
            },
            policy: CatalogPolicy::new(
                var("RESERVED_PRODUCT_KEYWORD").unwrap_or_else(|| DEFAULT_RESERVED_KEYWORD.to_string()),
            ),
            log_format,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database: DatabaseConfig::in_memory(),
            policy: CatalogPolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}
