//! Environment-driven service configuration.

use follow_core::FollowGraphConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Public surface (`FOLLOW_LISTEN`).
    pub listen: SocketAddr,
    /// Service-to-service surface (`FOLLOW_INTERNAL_LISTEN`).
    pub internal_listen: SocketAddr,
    /// SQLite database file; in-memory store when unset (`FOLLOW_SQLITE_PATH`).
    pub sqlite_path: Option<PathBuf>,
    pub user_service_url: String,
    pub post_service_url: String,
    pub peer_timeout: Duration,
    pub store_timeout: Duration,
    pub max_page_size: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        Ok(Self {
            listen: parse("FOLLOW_LISTEN", get("FOLLOW_LISTEN", "0.0.0.0:8080"))?,
            internal_listen: parse(
                "FOLLOW_INTERNAL_LISTEN",
                get("FOLLOW_INTERNAL_LISTEN", "0.0.0.0:9090"),
            )?,
            sqlite_path: lookup("FOLLOW_SQLITE_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            user_service_url: get("USER_SERVICE_URL", "http://127.0.0.1:8001"),
            post_service_url: get("POST_SERVICE_URL", "http://127.0.0.1:8002"),
            peer_timeout: Duration::from_millis(parse(
                "PEER_TIMEOUT_MS",
                get("PEER_TIMEOUT_MS", "2000"),
            )?),
            store_timeout: Duration::from_millis(parse(
                "STORE_TIMEOUT_MS",
                get("STORE_TIMEOUT_MS", "5000"),
            )?),
            max_page_size: parse("FOLLOW_MAX_PAGE_SIZE", get("FOLLOW_MAX_PAGE_SIZE", "100"))?,
        })
    }

    pub fn graph_config(&self) -> FollowGraphConfig {
        FollowGraphConfig {
            store_timeout: self.store_timeout,
            peer_timeout: self.peer_timeout,
            max_page_size: self.max_page_size,
        }
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
