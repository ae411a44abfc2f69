//! HTTP GET with bounded retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::error::{FetchError, FetchErrorKind};
use super::rate_limit::RateLimiter;
use crate::config::FeedsConfig;

/// Exponential backoff with jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per URL, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &FeedsConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.backoff_base_ms),
            max_delay: Duration::from_millis(config.backoff_max_ms),
        }
    }

    /// Delay after the `failed`-th failed attempt (1-based).
    ///
    /// `base · 2^(failed-1)`, capped at `max_delay`, then scaled into
    /// `[50%, 100%)` by `jitter ∈ [0, 1)`.
    #[must_use]
    pub fn delay_for(&self, failed: u32, jitter: f64) -> Duration {
        let exponent = failed.saturating_sub(1).min(16);
        let backoff = self
            .base_delay
            .saturating_mul(1_u32 << exponent)
            .min(self.max_delay);
        backoff.mul_f64(0.5 + 0.5 * jitter.clamp(0.0, 1.0))
    }
}

/// One in-flight attempt. Never outlives the retry loop.
#[derive(Debug, Clone)]
pub struct FetchTask {
    pub url: String,
    pub attempt: u32,
    pub deadline: Instant,
}

/// GETs raw bytes, retrying transient failures per [`RetryPolicy`].
///
/// With a [`RateLimiter`] attached, a token is taken before every attempt,
/// retries included.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
    timeout: Duration,
    headers: Vec<(&'static str, String)>,
    limiter: Option<Arc<RateLimiter>>,
}

impl Fetcher {
    #[must_use]
    pub fn new(client: reqwest::Client, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            client,
            policy,
            timeout,
            headers: Vec::new(),
            limiter: None,
        }
    }

    /// Build a fetcher for the chamber feeds.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error when the HTTP client cannot be built
    /// (e.g. no TLS backend).
    pub fn from_config(config: &FeedsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::new(
            client,
            RetryPolicy::from_config(config),
            config.request_timeout(),
        ))
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Send `name: value` on every request.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[must_use]
    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.limiter.as_deref()
    }

    /// GET `url` with the configured per-attempt timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] once a permanent failure occurs, attempts run
    /// out, or the rate limiter refuses to wait any longer.
    pub async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.get_with_timeout(url, self.timeout).await
    }

    /// GET `url` with an explicit per-attempt timeout.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn get_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0_u32;

        loop {
            attempt += 1;

            if let Some(limiter) = &self.limiter {
                if let Err(err) = limiter.acquire().await {
                    tracing::warn!(url, attempt, error = %err, "rate limiter refused request");
                    return Err(FetchError::new(url, attempt, FetchErrorKind::RateLimited));
                }
            }

            let task = FetchTask {
                url: url.to_string(),
                attempt,
                deadline: Instant::now() + timeout,
            };
            let kind = match self.attempt(&task).await {
                Ok(bytes) => {
                    tracing::debug!(url, attempt, bytes = bytes.len(), "fetched");
                    return Ok(bytes);
                }
                Err(kind) => kind,
            };

            if !kind.is_transient() {
                tracing::error!(url, attempt, error = %kind, "permanent fetch failure");
                return Err(FetchError::new(url, attempt, kind));
            }
            if attempt >= max_attempts {
                tracing::error!(url, attempt, error = %kind, "fetch attempts exhausted");
                return Err(FetchError::new(url, attempt, kind));
            }

            let delay = self.policy.delay_for(attempt, rand::random::<f64>());
            tracing::warn!(
                url,
                attempt,
                error = %kind,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "transient fetch failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, task: &FetchTask) -> Result<Vec<u8>, FetchErrorKind> {
        let mut request = self.client.get(&task.url);
        for (name, value) in &self.headers {
            request = request.header(*name, value);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchErrorKind::from_status(status.as_u16()));
            }
            let body = response.bytes().await?;
            Ok(body.to_vec())
        };

        match tokio::time::timeout_at(task.deadline, exchange).await {
            Ok(result) => result,
            Err(_) => Err(FetchErrorKind::Timeout),
        }
    }
}
