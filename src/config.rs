use std::{env, net::SocketAddr, time::Duration};

use axum::http::HeaderValue;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_RATE_LIMIT: u32 = 100;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    Any,
    Origins(Vec<HeaderValue>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub rate_limit: u32,
    pub rate_limit_window: Duration,
    pub cors: CorsPolicy,
    pub environment: String,
    pub ping_interval: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid u16")]
    InvalidPort,
    #[error("RATE_LIMIT must be a positive integer")]
    InvalidRateLimit,
    #[error("CORS_ORIGIN contains an invalid origin: {0}")]
    InvalidCorsOrigin(String),
    #[error("SSE_PING_INTERVAL_SECS must be a positive integer")]
    InvalidPingInterval,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);
        let rate_limit = var("RATE_LIMIT")
            .map(|value| {
                value
                    .parse::<u32>()
                    .ok()
                    .filter(|limit| *limit > 0)
                    .ok_or(ConfigError::InvalidRateLimit)
            })
            .transpose()?
            .unwrap_or(DEFAULT_RATE_LIMIT);
        let cors = var("CORS_ORIGIN")
            .map(|value| parse_cors_origin(&value))
            .transpose()?
            .unwrap_or(CorsPolicy::Any);
        let environment = var("APP_ENV")
            .or_else(|| var("NODE_ENV"))
            .unwrap_or_else(|| "development".to_string());
        let ping_interval = var("SSE_PING_INTERVAL_SECS")
            .map(|value| {
                value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::InvalidPingInterval)
            })
            .transpose()?
            .unwrap_or(DEFAULT_PING_INTERVAL);

        let config = Self {
            bind_addr,
            port,
            rate_limit,
            rate_limit_window: RATE_LIMIT_WINDOW,
            cors,
            environment,
            ping_interval,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_limit_window: RATE_LIMIT_WINDOW,
            cors: CorsPolicy::Any,
            environment: "development".to_string(),
            ping_interval: DEFAULT_PING_INTERVAL,
        }
    }
}

fn parse_cors_origin(value: &str) -> Result<CorsPolicy, ConfigError> {
    if value == "*" {
        return Ok(CorsPolicy::Any);
    }

    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| ConfigError::InvalidCorsOrigin(origin.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CorsPolicy::Origins)
}
