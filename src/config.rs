//! Configuration types for image-acquire
//!
//! The configuration is resolved once at startup ([`Config::from_env`] is the only
//! place the process environment is consulted) and then shared read-only, behind an
//! `Arc`, with every candidate source.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Environment variable holding the SerpApi key
pub const SERPAPI_KEY_VAR: &str = "SERPAPI_KEY";
/// Environment variable holding the Unsplash access key
pub const UNSPLASH_KEY_VAR: &str = "UNSPLASH_ACCESS_KEY";
/// Environment variable holding the Pexels API key
pub const PEXELS_KEY_VAR: &str = "PEXELS_API_KEY";

/// Provider credentials
///
/// A missing credential makes the corresponding provider report `Unavailable`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// SerpApi key (primary web search)
    #[serde(default)]
    pub serpapi_key: Option<String>,

    /// Unsplash access key (stock photos)
    #[serde(default)]
    pub unsplash_access_key: Option<String>,

    /// Pexels API key (stock photos)
    #[serde(default)]
    pub pexels_api_key: Option<String>,
}

// Keys never reach logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn mask(key: &Option<String>) -> &'static str {
            if key.is_some() { "<set>" } else { "<unset>" }
        }
        f.debug_struct("Credentials")
            .field("serpapi_key", &mask(&self.serpapi_key))
            .field("unsplash_access_key", &mask(&self.unsplash_access_key))
            .field("pexels_api_key", &mask(&self.pexels_api_key))
            .finish()
    }
}

/// Network timeouts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Timeout for provider lookups (default: 15 seconds)
    #[serde(default = "default_lookup_timeout", with = "duration_serde")]
    pub lookup: Duration,

    /// Timeout for payload downloads (default: 30 seconds)
    #[serde(default = "default_download_timeout", with = "duration_serde")]
    pub download: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            lookup: default_lookup_timeout(),
            download: default_download_timeout(),
        }
    }
}

/// Retry configuration for transient payload download failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 5 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Search behaviour
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Candidates requested per wanted image, to tolerate broken candidates (default: 3)
    #[serde(default = "default_overfetch_factor")]
    pub overfetch_factor: usize,

    /// User-Agent sent with every request (default: "Mozilla/5.0")
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Pixel size requested from the logo provider (default: 200)
    #[serde(default = "default_logo_size")]
    pub logo_size: u32,

    /// Logo responses at or below this many bytes are treated as placeholders (default: 100)
    #[serde(default = "default_min_logo_bytes")]
    pub min_logo_bytes: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            overfetch_factor: default_overfetch_factor(),
            user_agent: default_user_agent(),
            logo_size: default_logo_size(),
            min_logo_bytes: default_min_logo_bytes(),
        }
    }
}

/// Base URLs of every provider
///
/// Overridable so tests and proxies can redirect traffic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// SerpApi base URL
    #[serde(default = "default_serpapi_url")]
    pub serpapi: String,

    /// DuckDuckGo base URL
    #[serde(default = "default_duckduckgo_url")]
    pub duckduckgo: String,

    /// Logo.dev image base URL
    #[serde(default = "default_logo_dev_url")]
    pub logo_dev: String,

    /// Unsplash API base URL
    #[serde(default = "default_unsplash_url")]
    pub unsplash: String,

    /// Pexels API base URL
    #[serde(default = "default_pexels_url")]
    pub pexels: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            serpapi: default_serpapi_url(),
            duckduckgo: default_duckduckgo_url(),
            logo_dev: default_logo_dev_url(),
            unsplash: default_unsplash_url(),
            pexels: default_pexels_url(),
        }
    }
}

/// Output location defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for auto-generated filenames (default: "images")
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// Main configuration
///
/// Fields are organized into sub-configs:
/// - [`credentials`](Credentials): provider keys
/// - [`timeouts`](TimeoutConfig): lookup and download timeouts
/// - [`retry`](RetryConfig): payload download retries
/// - [`search`](SearchConfig): over-fetch, user agent, logo parameters
/// - [`endpoints`](EndpointConfig): provider base URLs
/// - [`output`](OutputConfig): default output directory
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// Network timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Payload download retries
    #[serde(default)]
    pub retry: RetryConfig,

    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,

    /// Provider base URLs
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Output defaults
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Build the default configuration with credentials taken from the environment
    ///
    /// Empty variables are treated as absent.
    pub fn from_env() -> Self {
        Self::default().with_credentials(Credentials {
            serpapi_key: env_key(SERPAPI_KEY_VAR),
            unsplash_access_key: env_key(UNSPLASH_KEY_VAR),
            pexels_api_key: env_key(PEXELS_KEY_VAR),
        })
    }

    /// Replace the credentials
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Check the configuration for values that would make acquisition impossible
    pub fn validate(&self) -> Result<()> {
        if self.search.overfetch_factor == 0 {
            return Err(Error::config(
                "search.overfetch_factor",
                "over-fetch factor must be at least 1",
            ));
        }
        if self.timeouts.lookup.is_zero() {
            return Err(Error::config("timeouts.lookup", "timeout must be non-zero"));
        }
        if self.timeouts.download.is_zero() {
            return Err(Error::config(
                "timeouts.download",
                "timeout must be non-zero",
            ));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(Error::config(
                "retry.backoff_multiplier",
                "backoff multiplier must be >= 1.0",
            ));
        }
        Ok(())
    }
}

fn env_key(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Default value functions
fn default_lookup_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_overfetch_factor() -> usize {
    3
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_logo_size() -> u32 {
    200
}

fn default_min_logo_bytes() -> usize {
    100
}

fn default_serpapi_url() -> String {
    "https://serpapi.com".to_string()
}

fn default_duckduckgo_url() -> String {
    "https://duckduckgo.com".to_string()
}

fn default_logo_dev_url() -> String {
    "https://img.logo.dev".to_string()
}

fn default_unsplash_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_pexels_url() -> String {
    "https://api.pexels.com".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("images")
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
