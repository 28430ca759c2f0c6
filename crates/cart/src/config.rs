//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_API_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `SHOPFRONT_API_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SHOPFRONT_CART_PREFIX` - Path prefix of the cart endpoints (default: /cart)
//! - `SHOPFRONT_CATALOG_CACHE_TTL_SECS` - Product snapshot cache TTL (default: 300)
//! - `SHOPFRONT_AUTH_FALLBACK` - Allow offline demo logins when the API is down (default: false)
//! - `SHOPFRONT_API_TOKEN` - Bearer token of an existing session

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: &str = "30";
const DEFAULT_CART_PREFIX: &str = "/cart";
const DEFAULT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart client configuration.
///
/// Implements `Debug` manually to redact the session token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL every API path is resolved against
    pub api_url: Url,
    /// Timeout applied to each HTTP request
    pub timeout: Duration,
    /// Path prefix of the cart endpoints (e.g. `/cart` or `/api/cart`)
    pub cart_prefix: String,
    /// How long product snapshots stay cached
    pub catalog_cache_ttl: Duration,
    /// Whether logins may fall back to local demo accounts
    pub auth_fallback: bool,
    /// Bearer token of an already established session
    pub api_token: Option<SecretString>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("timeout", &self.timeout)
            .field("cart_prefix", &self.cart_prefix)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .field("auth_fallback", &self.auth_fallback)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ClientConfig {
    /// Configuration with defaults for everything but the API URL.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            timeout: Duration::from_secs(30),
            cart_prefix: DEFAULT_CART_PREFIX.to_string(),
            catalog_cache_ttl: Duration::from_secs(300),
            auth_fallback: false,
            api_token: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let api_url = env.required("SHOPFRONT_API_URL")?;
        let api_url = Url::parse(&api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), e.to_string())
        })?;
        if api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPFRONT_API_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let timeout = env.seconds("SHOPFRONT_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let catalog_cache_ttl =
            env.seconds("SHOPFRONT_CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let cart_prefix = normalize_prefix(
            &env.or_default("SHOPFRONT_CART_PREFIX", DEFAULT_CART_PREFIX),
        )
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "SHOPFRONT_CART_PREFIX".to_string(),
                "must start with '/'".to_string(),
            )
        })?;
        let auth_fallback = env
            .or_default("SHOPFRONT_AUTH_FALLBACK", "false")
            .parse::<bool>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPFRONT_AUTH_FALLBACK".to_string(), e.to_string())
            })?;
        let api_token = env
            .optional("SHOPFRONT_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);

        Ok(Self {
            api_url,
            timeout,
            cart_prefix,
            catalog_cache_ttl,
            auth_fallback,
            api_token,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        (self.0)(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a whole number of seconds.
    fn seconds(&self, key: &str, default: &str) -> Result<Duration, ConfigError> {
        self.or_default(key, default)
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Strip trailing slashes; reject prefixes that are not absolute paths.
fn normalize_prefix(prefix: &str) -> Option<String> {
    let prefix = prefix.trim();
    if !prefix.starts_with('/') {
        return None;
    }
    let trimmed = prefix.trim_end_matches('/');
    Some(if trimmed.is_empty() {
        String::new()
    } else {
        trimmed.to_string()
    })
}
