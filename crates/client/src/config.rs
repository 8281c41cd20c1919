//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TRYLA_API_URL` - Base URL of the REST backend (default: `http://localhost:4000`)
//! - `TRYLA_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `TRYLA_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Backend URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:4000";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// REST client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend; endpoint paths are appended to it.
    pub api_url: Url,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// How long catalog reads stay cached.
    pub cache_ttl: Duration,
}

impl ClientConfig {
    /// Configuration for a backend at `api_url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or
    /// cannot carry a path.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("TRYLA_API_URL", api_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_env_or_default("TRYLA_API_URL", DEFAULT_API_URL);
        let timeout = get_secs_or_default("TRYLA_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let cache_ttl = get_secs_or_default("TRYLA_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;

        Ok(Self {
            api_url: parse_api_url("TRYLA_API_URL", &api_url)?,
            timeout,
            cache_ttl,
        })
    }

    /// Override the backend URL (e.g. from a command-line flag).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = parse_api_url("--api-url", api_url)?;
        Ok(self)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a whole number of seconds with a default value.
fn get_secs_or_default(key: &str, default: u64) -> Result<Duration, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

/// Parse and sanity-check a backend base URL.
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{raw} cannot be used as a base URL"),
        ));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_backend() {
        let config = ClientConfig::new(DEFAULT_API_URL).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:4000/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_new_accepts_path_prefix() {
        let config = ClientConfig::new("https://api.tryla.in/v1").unwrap();
        assert_eq!(config.api_url.path(), "/v1");
    }

    #[test]
    fn test_rejects_non_http_urls() {
        assert!(matches!(
            ClientConfig::new("mailto:shop@tryla.in"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            ClientConfig::new("ftp://tryla.in"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn test_with_api_url_override() {
        let config = ClientConfig::new(DEFAULT_API_URL)
            .unwrap()
            .with_api_url("http://127.0.0.1:9999")
            .unwrap();
        assert_eq!(config.api_url.port(), Some(9999));
    }
}
