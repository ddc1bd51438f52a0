//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BAZARYO_API_URL` - Backend base URL (default: `http://localhost:5000/api`)
//! - `BAZARYO_API_TOKEN` - Bearer token to start with an existing session
//! - `BAZARYO_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `BAZARYO_CATALOG_TTL_SECS` - Shop and product cache lifetime (default: 60)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Backend base URL used when `BAZARYO_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CATALOG_TTL_SECS: u64 = 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Bazaryo client configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend base URL, always ending in `/`.
    pub api_url: Url,
    /// Bearer token for an existing session.
    pub api_token: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How long shop and product listings stay cached.
    pub catalog_ttl: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .field("catalog_ttl", &self.catalog_ttl)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration for `api_url` with default timeouts and no token.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not an absolute
    /// `http` or `https` URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("BAZARYO_API_URL", api_url)?,
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("BAZARYO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url("BAZARYO_API_URL", &api_url)?;

        let api_token = lookup("BAZARYO_API_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from);

        let timeout = parse_secs(
            "BAZARYO_TIMEOUT_SECS",
            lookup("BAZARYO_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?;
        let catalog_ttl = parse_secs(
            "BAZARYO_CATALOG_TTL_SECS",
            lookup("BAZARYO_CATALOG_TTL_SECS"),
            DEFAULT_CATALOG_TTL_SECS,
        )?;

        Ok(Self {
            api_url,
            api_token,
            timeout,
            catalog_ttl,
        })
    }

    /// The configured token, for operations that need a signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `BAZARYO_API_TOKEN` was not set.
    pub fn require_token(&self) -> Result<&SecretString, ConfigError> {
        self.api_token
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("BAZARYO_API_TOKEN".to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the backend URL and make sure it ends in `/` so that endpoint paths
/// extend it rather than replace its last segment.
fn parse_api_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected an http(s) URL, got {value}"),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a whole number of seconds, falling back to `default` when unset.
fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let secs = match value {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api/");
        assert!(config.api_token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.catalog_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("BAZARYO_API_URL", "https://api.bazaryo.in/v1/"),
            ("BAZARYO_API_TOKEN", "eyJhbGciOi.token"),
            ("BAZARYO_TIMEOUT_SECS", "5"),
            ("BAZARYO_CATALOG_TTL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.bazaryo.in/v1/");
        assert_eq!(
            config.api_token.as_ref().unwrap().expose_secret(),
            "eyJhbGciOi.token"
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.catalog_ttl, Duration::ZERO);
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[("BAZARYO_API_TOKEN", "  ")])).unwrap();
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err =
            ClientConfig::from_lookup(lookup(&[("BAZARYO_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(ref key, _) if key == "BAZARYO_TIMEOUT_SECS"
        ));

        let err =
            ClientConfig::from_lookup(lookup(&[("BAZARYO_API_URL", "ftp://files")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn test_require_token() {
        let config = ClientConfig::new(DEFAULT_API_URL).unwrap();
        assert!(matches!(
            config.require_token(),
            Err(ConfigError::MissingEnvVar(ref key)) if key == "BAZARYO_API_TOKEN"
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut config = ClientConfig::new(DEFAULT_API_URL).unwrap();
        config.api_token = Some(SecretString::from("super-secret-token"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
