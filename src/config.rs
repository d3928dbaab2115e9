// src/config.rs
//! Server settings, read from the environment (and `.env` via dotenvy in main)

use crate::processing::SimulatorConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ZUCKKY_BIND_ADDR '{value}' is not a socket address: {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("{key} must be a whole number of milliseconds, got '{value}'")]
    InvalidMillis { key: &'static str, value: String },
    #[error("ZUCKKY_TICK_MS must be at least 1")]
    ZeroTickPeriod,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub upload_dir: PathBuf,
    /// Remote backend for WebSocket sessions, e.g. `http://backend:3000/api`.
    /// Unset means sessions talk to this server's own services in-process.
    pub gateway_url: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Prefix for edited video links. Unset means the request's Host header is used.
    pub public_base_url: Option<String>,
    pub simulator: SimulatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            gateway_url: None,
            gemini_api_key: None,
            public_base_url: None,
            simulator: SimulatorConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Config::default();

        let bind_addr = match get("ZUCKKY_BIND_ADDR") {
            Some(value) => value
                .parse::<SocketAddr>()
                .map_err(|source| ConfigError::InvalidBindAddr { value, source })?,
            None => defaults.bind_addr,
        };

        let millis = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match get(key) {
                Some(value) => value
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|_| ConfigError::InvalidMillis { key, value }),
                None => Ok(default),
            }
        };

        let tick_period = millis("ZUCKKY_TICK_MS", defaults.simulator.tick_period)?;
        if tick_period.is_zero() {
            return Err(ConfigError::ZeroTickPeriod);
        }
        let simulator = SimulatorConfig {
            tick_period,
            final_delay: millis("ZUCKKY_FINAL_DELAY_MS", defaults.simulator.final_delay)?,
        };

        Ok(Self {
            bind_addr,
            upload_dir: get("ZUCKKY_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            gateway_url: get("ZUCKKY_GATEWAY_URL"),
            gemini_api_key: get("GEMINI_API_KEY"),
            public_base_url: get("ZUCKKY_PUBLIC_HOST").map(|host| with_scheme(&host)),
            simulator,
        })
    }
}

fn with_scheme(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
