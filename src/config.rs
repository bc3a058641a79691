//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

use crate::api::strava::StravaConfig;
use crate::storage::FileMedium;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL in {var}: {reason}")]
    InvalidUrl { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root every request path is appended to, without trailing slash.
    pub api_url: String,
    /// Where the session file lives; `None` keeps the session in memory.
    pub store_path: Option<PathBuf>,
    pub timeouts: Timeouts,
    /// External provider linking; `None` disables it.
    pub strava: Option<StravaConfig>,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CYCLITY_API_URL`: default `http://localhost:8000/api/v1`
    /// - `CYCLITY_STORE_PATH`: default `<data dir>/cyclity/session.json`
    /// - `CYCLITY_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CYCLITY_CONNECT_TIMEOUT_SECS`: default 10
    /// - `STRAVA_CLIENT_ID` + `CYCLITY_BACKEND_URL`: enable Strava linking
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `CYCLITY_API_URL` is not an
    /// absolute http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading variables through `var`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `CYCLITY_API_URL` is not an
    /// absolute http(s) URL.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = var("CYCLITY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_url = parse_api_url("CYCLITY_API_URL", &api_url)?;

        let store_path = var("CYCLITY_STORE_PATH")
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .or_else(FileMedium::default_path);

        let timeouts = Timeouts {
            request_secs: parse_u64(var("CYCLITY_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(var("CYCLITY_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_url, store_path, timeouts, strava: StravaConfig::from_vars(&var) })
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(default)
}

fn parse_api_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(raw).map_err(|e| ConfigError::InvalidUrl { var, reason: e.to_string() })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl { var, reason: format!("unsupported scheme '{}'", url.scheme()) });
    }
    Ok(raw.trim_end_matches('/').to_owned())
}
