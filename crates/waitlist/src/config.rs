//! Waitlist client configuration.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RESTOCK_API_URL` - Base URL of the waitlist service (e.g., `https://waitlist.example.com`)
//! - `RESTOCK_SHOP_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//!
//! ## Optional
//! - `RESTOCK_API_KEY` - Bearer token forwarded on every request
//! - `RESTOCK_CACHE_DURATION_MS` - Waitlist count cache lifetime (default: 60000)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Timeout hosts should apply to waitlist requests.
///
/// The client core never enforces it; see [`crate::HttpTransport::with_timeout`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Minimum time a form should be on screen before it may be submitted.
///
/// Anti-bot measure enforced by the hosting UI, not by this crate.
pub const MIN_SUBMIT_DELAY: Duration = Duration::from_millis(1_000);

/// How long a fetched waitlist count is served from cache.
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_millis(60_000);

pub use restock_core::MAX_INPUT_LENGTH;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid waitlist configuration: {0}")]
    Invalid(String),
}

/// Waitlist service configuration.
///
/// Immutable once built; every client operation reads from it. Implements
/// `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct WaitlistConfig {
    api_url: String,
    shop_domain: String,
    api_key: Option<SecretString>,
    cache_duration: Duration,
}

impl std::fmt::Debug for WaitlistConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitlistConfig")
            .field("api_url", &self.api_url)
            .field("shop_domain", &self.shop_domain)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("cache_duration", &self.cache_duration)
            .finish()
    }
}

impl WaitlistConfig {
    /// Build a configuration, failing fast on unusable values.
    ///
    /// A trailing `/` on `api_url` is dropped. An empty API key is treated as
    /// no key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the shop domain is blank or the API
    /// URL is not an absolute `http`/`https` URL.
    pub fn new(
        api_url: &str,
        shop_domain: &str,
        api_key: Option<SecretString>,
    ) -> Result<Self, ConfigError> {
        let api_url = api_url.trim().trim_end_matches('/');
        let parsed = Url::parse(api_url)
            .map_err(|e| ConfigError::Invalid(format!("api url {api_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "api url must use http or https, got {}",
                parsed.scheme()
            )));
        }

        let shop_domain = shop_domain.trim();
        if shop_domain.is_empty() {
            return Err(ConfigError::Invalid("shop domain is empty".to_string()));
        }

        let api_key = api_key.filter(|key| !key.expose_secret().trim().is_empty());

        Ok(Self {
            api_url: api_url.to_string(),
            shop_domain: shop_domain.to_string(),
            api_key,
            cache_duration: DEFAULT_CACHE_DURATION,
        })
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

        let api_url = get_required_env("RESTOCK_API_URL")?;
        let shop_domain = get_required_env("RESTOCK_SHOP_DOMAIN")?;
        let api_key = get_optional_env("RESTOCK_API_KEY").map(SecretString::from);
        let cache_duration_ms = get_env_or_default("RESTOCK_CACHE_DURATION_MS", "60000")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("RESTOCK_CACHE_DURATION_MS".to_string(), e.to_string())
            })?;

        Ok(Self::new(&api_url, &shop_domain, api_key)?
            .with_cache_duration(Duration::from_millis(cache_duration_ms)))
    }

    /// Override how long waitlist counts stay fresh.
    #[must_use]
    pub fn with_cache_duration(mut self, cache_duration: Duration) -> Self {
        self.cache_duration = cache_duration;
        self
    }

    /// Base URL of the waitlist service, without trailing slash.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Shopify store domain sent as `shop` with every request.
    #[must_use]
    pub fn shop_domain(&self) -> &str {
        &self.shop_domain
    }

    /// Bearer token, if one is configured.
    #[must_use]
    pub const fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }

    /// How long waitlist counts stay fresh.
    #[must_use]
    pub const fn cache_duration(&self) -> Duration {
        self.cache_duration
    }

    /// `POST` endpoint for joining a waitlist.
    #[must_use]
    pub fn join_url(&self) -> String {
        format!("{}/api/v1/join", self.api_url)
    }

    /// `POST` endpoint for leaving a waitlist.
    #[must_use]
    pub fn leave_url(&self) -> String {
        format!("{}/api/v1/leave", self.api_url)
    }

    /// `GET` endpoint for a variant's waitlist count.
    #[must_use]
    pub fn count_url(&self, numeric_variant_id: &str) -> String {
        format!(
            "{}/api/v1/count/{}?shop={}",
            self.api_url,
            urlencoding::encode(numeric_variant_id),
            urlencoding::encode(&self.shop_domain)
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
