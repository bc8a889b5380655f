//! Data models and structures
//!
//! Defines the relay configuration and the JSON bodies exchanged with
//! callers of the HTTP front door.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_MODEL: &str = "google/imagen-4";
pub const DEFAULT_NGROK_API_URL: &str = "http://127.0.0.1:4040";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Value shipped in `.env.local` templates; treated as "not configured".
const TOKEN_PLACEHOLDER: &str = "your_replicate_api_token_here";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UrlResponse {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub replicate_api_token: Option<String>,
    pub port: u16,
    pub model: String,
    pub replicate_base_url: String,
    pub poll_interval: Duration,
    pub max_upload_bytes: usize,
    pub sanitize_errors: bool,
    pub tunnel: TunnelConfig,
}

#[derive(Debug, Clone)]
pub struct TunnelConfig {
    pub enabled: bool,
    pub binary: String,
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            replicate_api_token: None,
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            replicate_base_url: crate::ai::replicate::client::DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_millis(1000),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            sanitize_errors: false,
            tunnel: TunnelConfig {
                enabled: true,
                binary: "ngrok".to_string(),
                api_url: DEFAULT_NGROK_API_URL.to_string(),
            },
        }
    }
}

impl Config {
    /// Load `.env.local` then `.env` (first definition wins) and read the
    /// process environment.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::from_filename(".env.local").ok();
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let replicate_api_token = lookup("REPLICATE_API_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && t != TOKEN_PLACEHOLDER);

        Ok(Self {
            replicate_api_token,
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            model: lookup("REPLICATE_MODEL").unwrap_or(defaults.model),
            replicate_base_url: lookup("REPLICATE_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.replicate_base_url),
            poll_interval: parse_var(&lookup, "REPLICATE_POLL_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
            sanitize_errors: parse_bool(&lookup, "SANITIZE_ERRORS")?
                .unwrap_or(defaults.sanitize_errors),
            tunnel: TunnelConfig {
                enabled: parse_bool(&lookup, "NGROK_ENABLED")?
                    .unwrap_or(defaults.tunnel.enabled),
                binary: lookup("NGROK_BIN").unwrap_or(defaults.tunnel.binary),
                api_url: lookup("NGROK_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.tunnel.api_url),
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> crate::Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| crate::Error::Config(format!("Invalid value for {}: '{}'", key, raw))),
    }
}

fn parse_bool<F>(lookup: &F, key: &str) -> crate::Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(crate::Error::Config(format!(
                "Invalid boolean for {}: '{}'",
                key, v
            ))),
        },
    }
}
