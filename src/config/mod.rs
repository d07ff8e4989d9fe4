//! Configuration module for the forum backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Page size used when a listing request does not specify one
    pub default_page_size: i64,
    /// Cap applied to the reported total of paged listings
    pub amount_to_take: i64,
    /// Number of tags shown by the popular tags partial
    pub popular_tag_count: i64,
}

/// A configuration variable held a value that could not be parsed.
#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid value for {}: {:?}", self.key, self.value)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("FORUM_DB_PATH")
            .unwrap_or_else(|| "./data/forum.sqlite".to_string())
            .into();

        let bind_addr = parse_or(&lookup, "FORUM_BIND_ADDR", "127.0.0.1:8080".parse())?;

        let log_level = lookup("FORUM_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let default_page_size = positive_or(&lookup, "FORUM_DEFAULT_PAGE_SIZE", 20)?;
        let amount_to_take = positive_or(&lookup, "FORUM_AMOUNT_TO_TAKE", 100)?;
        let popular_tag_count = positive_or(&lookup, "FORUM_POPULAR_TAG_COUNT", 100)?;

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            default_page_size,
            amount_to_take,
            popular_tag_count,
        })
    }
}

fn parse_or<F, T, E>(lookup: &F, key: &'static str, default: Result<T, E>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value.parse().map_err(|_| ConfigError { key, value }),
        None => default.map_err(|_| ConfigError {
            key,
            value: String::new(),
        }),
    }
}

fn positive_or<F>(lookup: &F, key: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, Ok::<i64, ()>(default))?;
    if value < 1 {
        return Err(ConfigError {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}
