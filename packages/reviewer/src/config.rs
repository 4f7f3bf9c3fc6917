use dotenvy::dotenv;
use std::env;

use crate::common::ConfigError;
use crate::domains::articles::ConfirmationPolicy;

const DEFAULT_PAGE_SIZE: i64 = 10;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub page_size: i64,
    /// Whether accepting also needs a confirmation step (rejecting always does)
    pub confirm_accept: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        if !(database_url.starts_with("postgres://") || database_url.starts_with("postgresql://"))
        {
            return Err(ConfigError::Invalid {
                var: "DATABASE_URL",
                reason: "expected a postgres:// connection string".to_string(),
            });
        }

        let page_size = match lookup("PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(size) if size >= 1 => size,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "PAGE_SIZE",
                        reason: format!("{:?} is not a positive integer", raw),
                    })
                }
            },
            None => DEFAULT_PAGE_SIZE,
        };

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(max) if max >= 1 => max,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DATABASE_MAX_CONNECTIONS",
                        reason: format!("{:?} is not a positive integer", raw),
                    })
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let confirm_accept = match lookup("REVIEW_CONFIRM_ACCEPT") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "REVIEW_CONFIRM_ACCEPT",
                reason: format!("{:?} is not true or false", raw),
            })?,
            None => true,
        };

        Ok(Self {
            database_url,
            database_max_connections,
            page_size,
            confirm_accept,
        })
    }

    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            confirm_accept: self.confirm_accept,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
