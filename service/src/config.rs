use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Service configuration loaded from multiple sources.
///
/// Configuration is loaded in priority order (lowest to highest):
/// 1. Struct defaults
/// 2. config.yaml file (if exists)
/// 3. Environment variables with TC_ prefix (always wins)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub congress_api: CongressApiConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chamber XML feeds and the fetch policy used against them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedsConfig {
    /// House Clerk EVS base URL; documents live at `{base}/{year}/roll{NNN}.xml`.
    #[serde(default = "default_house_base_url")]
    pub house_base_url: String,

    /// Senate LIS roll-call base URL.
    #[serde(default = "default_senate_base_url")]
    pub senate_base_url: String,

    /// Senate member roster used to resolve party and BioGuide ids.
    #[serde(default = "default_senate_roster_url")]
    pub senate_roster_url: String,

    /// Fetch the roster when a Senate vote is requested (default: true).
    #[serde(default = "default_true")]
    pub senate_roster_enabled: bool,

    /// Maximum in-flight XML fetches across all callers.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-attempt request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per document, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First retry delay in milliseconds; doubles per attempt.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound on a single retry delay in milliseconds.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl FeedsConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Congress.gov JSON API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CongressApiConfig {
    #[serde(default = "default_congress_api_base_url")]
    pub base_url: String,

    /// API key sent as `X-API-Key`. Only needed for bill and member lookups.
    #[serde(default)]
    pub api_key: String,

    /// Sustained request rate ceiling.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// Requests allowed back-to-back before the rate ceiling applies.
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Longest a request may wait for rate-limit capacity, in seconds.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

impl CongressApiConfig {
    #[must_use]
    pub const fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Deadline for one engine call (single vote or member batch), in seconds.
    #[serde(default = "default_call_deadline_secs")]
    pub call_deadline_secs: u64,
}

impl EngineConfig {
    #[must_use]
    pub const fn call_deadline(&self) -> Duration {
        Duration::from_secs(self.call_deadline_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (debug, info, warn, error) or a full `EnvFilter` directive.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_house_base_url() -> String {
    "https://clerk.house.gov/evs".to_string()
}

fn default_senate_base_url() -> String {
    "https://www.senate.gov/legislative/LIS/roll_call_votes".to_string()
}

fn default_senate_roster_url() -> String {
    "https://www.senate.gov/legislative/LIS_MEMBER/cvc_member_data.xml".to_string()
}

fn default_congress_api_base_url() -> String {
    "https://api.congress.gov/v3".to_string()
}

fn default_user_agent() -> String {
    format!("tinycongress-votes/{}", env!("CARGO_PKG_VERSION"))
}

fn default_log_level() -> String {
    "info".to_string()
}

// These functions cannot be const because serde uses function pointers for defaults
#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_concurrency() -> usize {
    5
}

#[allow(clippy::missing_const_for_fn)]
fn default_request_timeout_secs() -> u64 {
    20
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_attempts() -> u32 {
    3
}

#[allow(clippy::missing_const_for_fn)]
fn default_backoff_base_ms() -> u64 {
    500
}

#[allow(clippy::missing_const_for_fn)]
fn default_backoff_max_ms() -> u64 {
    8_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_requests_per_second() -> f64 {
    1.3
}

#[allow(clippy::missing_const_for_fn)]
fn default_burst() -> u32 {
    10
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_wait_secs() -> u64 {
    30
}

#[allow(clippy::missing_const_for_fn)]
fn default_call_deadline_secs() -> u64 {
    120
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            house_base_url: default_house_base_url(),
            senate_base_url: default_senate_base_url(),
            senate_roster_url: default_senate_roster_url(),
            senate_roster_enabled: default_true(),
            max_concurrency: default_max_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CongressApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_congress_api_base_url(),
            api_key: String::new(),
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            call_deadline_secs: default_call_deadline_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Sources are merged in priority order:
    /// 1. Struct defaults (lowest)
    /// 2. config.yaml file (if exists)
    /// 3. Environment variables with TC_ prefix (highest)
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.yaml")
    }

    /// Load configuration with a custom YAML file path.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load_from(yaml_path: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("TC_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("feeds.house_base_url", &self.feeds.house_base_url),
            ("feeds.senate_base_url", &self.feeds.senate_base_url),
            ("feeds.senate_roster_url", &self.feeds.senate_roster_url),
            ("congress_api.base_url", &self.congress_api.base_url),
        ];
        for (name, url) in urls {
            if !is_http_url(url) {
                return Err(ConfigError::Validation(format!(
                    "{name} must start with http:// or https://, got: '{url}'"
                )));
            }
        }

        if self.feeds.max_concurrency == 0 {
            return Err(ConfigError::Validation(
                "feeds.max_concurrency cannot be 0".into(),
            ));
        }

        if self.feeds.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "feeds.max_attempts cannot be 0".into(),
            ));
        }

        if self.feeds.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "feeds.request_timeout_secs cannot be 0".into(),
            ));
        }

        if self.feeds.backoff_base_ms > self.feeds.backoff_max_ms {
            return Err(ConfigError::Validation(format!(
                "feeds.backoff_base_ms ({}) cannot exceed feeds.backoff_max_ms ({})",
                self.feeds.backoff_base_ms, self.feeds.backoff_max_ms
            )));
        }

        let rate = self.congress_api.requests_per_second;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "congress_api.requests_per_second must be positive, got: {rate}"
            )));
        }

        if self.congress_api.burst == 0 {
            return Err(ConfigError::Validation(
                "congress_api.burst cannot be 0".into(),
            ));
        }

        if self.engine.call_deadline_secs == 0 {
            return Err(ConfigError::Validation(
                "engine.call_deadline_secs cannot be 0".into(),
            ));
        }

        Ok(())
    }
}
