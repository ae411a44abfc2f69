//! Congress.gov API client for bill and member data.
//!
//! This module provides a trait-based HTTP client for the Congress.gov v3
//! JSON API. The trait abstraction enables:
//!
//! - Easy mocking in unit tests
//! - HTTP-level testing with `MockHttpServer` in integration tests
//! - Sharing the feed [`Fetcher`] retry policy and a [`RateLimiter`]
//!
//! # Example
//!
//! ```ignore
//! use tinycongress_votes::congress::{CongressApiClient, HttpCongressClient};
//! use tc_rollcall::BillType;
//!
//! let client = HttpCongressClient::new("https://api.congress.gov/v3", "my-api-key")?;
//! let bill = client.get_bill(118, BillType::Hr, 815).await?;
//! println!("{}: {}", bill.number, bill.title);
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tc_rollcall::{BillType, Chamber};
use thiserror::Error;

use super::types::{
    Bill, BillResponse, Cosponsor, CosponsorsResponse, Member, MemberFilters, MembersResponse,
};
use crate::config::CongressApiConfig;
use crate::fetch::{FetchError, FetchErrorKind, Fetcher, RateLimiter, RetryPolicy};

/// Cosponsors requested per page; the API maximum.
pub const COSPONSOR_PAGE_SIZE: u32 = 250;
/// Member search results requested.
pub const MEMBER_SEARCH_LIMIT: u32 = 20;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
const API_KEY_HEADER: &str = "X-API-Key";

/// Errors that can occur when calling the Congress API.
#[derive(Debug, Error)]
pub enum CongressApiError {
    /// Transport failure after retries (network, timeout, rate limit)
    #[error("HTTP request failed: {0}")]
    Request(#[source] FetchError),

    /// Bill or member not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an error response
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Arguments or configuration rejected before any request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CongressApiError {
    fn from_fetch(err: FetchError, what: impl Into<String>) -> Self {
        match err.kind {
            FetchErrorKind::HttpStatus(404) => Self::NotFound(what.into()),
            FetchErrorKind::HttpStatus(status) => Self::ApiError {
                status,
                message: err.to_string(),
            },
            _ => Self::Request(err),
        }
    }
}

/// Trait for Congress API operations.
///
/// Use `HttpCongressClient` for real HTTP calls, or
/// [`mock::MockCongressClient`] in tests.
#[async_trait]
pub trait CongressApiClient: Send + Sync {
    /// Get core metadata for one bill.
    async fn get_bill(
        &self,
        congress: u16,
        bill_type: BillType,
        number: u32,
    ) -> Result<Bill, CongressApiError>;

    /// List every cosponsor of a bill, following pagination.
    async fn list_cosponsors(
        &self,
        congress: u16,
        bill_type: BillType,
        number: u32,
    ) -> Result<Vec<Cosponsor>, CongressApiError>;

    /// Search members by name, optionally narrowed by congress, chamber and state.
    async fn search_members(
        &self,
        name: &str,
        filters: &MemberFilters,
    ) -> Result<Vec<Member>, CongressApiError>;
}

/// HTTP-based implementation of `CongressApiClient`.
///
/// Every request carries the API key header and goes through the shared
/// [`Fetcher`], so transient failures are retried and an attached
/// [`RateLimiter`] paces the calls.
pub struct HttpCongressClient {
    fetcher: Fetcher,
    base_url: String,
}

impl HttpCongressClient {
    /// Create a new client with the given base URL and API key, paced by the
    /// default Congress.gov rate ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`CongressApiError::InvalidRequest`] if the default rate
    /// ceiling cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, CongressApiError> {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Create a client with a custom `reqwest::Client` (for testing with custom config).
    ///
    /// # Errors
    ///
    /// See [`HttpCongressClient::new`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, CongressApiError> {
        let fetcher = Fetcher::new(client, RetryPolicy::default(), DEFAULT_TIMEOUT)
            .with_header(API_KEY_HEADER, api_key);
        Self::with_fetcher(fetcher, base_url)
    }

    /// Use a preconfigured fetcher. The caller is responsible for the API key
    /// header; a fetcher without a rate limiter gets the default ceiling.
    ///
    /// # Errors
    ///
    /// See [`HttpCongressClient::new`].
    pub fn with_fetcher(
        fetcher: Fetcher,
        base_url: impl Into<String>,
    ) -> Result<Self, CongressApiError> {
        let fetcher = if fetcher.rate_limiter().is_some() {
            fetcher
        } else {
            fetcher.with_rate_limiter(build_rate_limiter(&CongressApiConfig::default())?)
        };
        Ok(Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client paced by the configured requests-per-second limit.
    ///
    /// # Errors
    ///
    /// Returns [`CongressApiError::InvalidRequest`] for a missing API key, an
    /// unusable rate, or an HTTP client that cannot be built.
    pub fn from_config(
        config: &CongressApiConfig,
        policy: RetryPolicy,
        user_agent: &str,
    ) -> Result<Self, CongressApiError> {
        if config.api_key.trim().is_empty() {
            return Err(CongressApiError::InvalidRequest(
                "congress_api.api_key is not set (TC_CONGRESS_API__API_KEY)".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| CongressApiError::InvalidRequest(e.to_string()))?;

        let fetcher = Fetcher::new(client, policy, DEFAULT_TIMEOUT)
            .with_header(API_KEY_HEADER, config.api_key.clone())
            .with_rate_limiter(build_rate_limiter(config)?);
        Self::with_fetcher(fetcher, config.base_url.clone())
    }

    /// The ceiling every request is paced by.
    #[must_use]
    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.fetcher.rate_limiter()
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<String, CongressApiError> {
        let mut url = reqwest::Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| CongressApiError::InvalidRequest(format!("bad URL for {path}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("format", "json");
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        what: &str,
    ) -> Result<T, CongressApiError> {
        let bytes = self
            .fetcher
            .get(url)
            .await
            .map_err(|e| CongressApiError::from_fetch(e, what))?;
        serde_json::from_slice(&bytes).map_err(|e| CongressApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

fn bill_label(congress: u16, bill_type: BillType, number: u32) -> String {
    format!("{congress}-{}-{number}", bill_type.code())
}

fn build_rate_limiter(config: &CongressApiConfig) -> Result<Arc<RateLimiter>, CongressApiError> {
    RateLimiter::new(
        config.requests_per_second,
        config.burst,
        Some(config.max_wait()),
    )
    .map(Arc::new)
    .map_err(|e| CongressApiError::InvalidRequest(e.to_string()))
}

#[async_trait]
impl CongressApiClient for HttpCongressClient {
    async fn get_bill(
        &self,
        congress: u16,
        bill_type: BillType,
        number: u32,
    ) -> Result<Bill, CongressApiError> {
        let label = bill_label(congress, bill_type, number);
        let url = self.url(
            &format!("/bill/{congress}/{}/{number}", bill_type.code()),
            &[],
        )?;

        let response: BillResponse = self.get_json(&url, &label).await?;
        tracing::info!(bill = %label, title = %response.bill.title, "fetched bill");
        Ok(response.bill)
    }

    async fn list_cosponsors(
        &self,
        congress: u16,
        bill_type: BillType,
        number: u32,
    ) -> Result<Vec<Cosponsor>, CongressApiError> {
        let label = bill_label(congress, bill_type, number);
        let path = format!("/bill/{congress}/{}/{number}/cosponsors", bill_type.code());
        let mut cosponsors = Vec::new();
        let mut offset = 0_u32;

        loop {
            let url = self.url(
                &path,
                &[
                    ("limit", COSPONSOR_PAGE_SIZE.to_string()),
                    ("offset", offset.to_string()),
                ],
            )?;
            tracing::debug!(bill = %label, offset, "fetching cosponsors page");
            let page: CosponsorsResponse = self.get_json(&url, &label).await?;

            if page.cosponsors.is_empty() {
                break;
            }
            cosponsors.extend(page.cosponsors);

            let pagination = page.pagination.unwrap_or_default();
            let reached_count = pagination
                .count
                .is_some_and(|count| cosponsors.len() >= usize::try_from(count).unwrap_or(usize::MAX));
            if pagination.next.is_none() || reached_count {
                break;
            }
            offset = offset.saturating_add(COSPONSOR_PAGE_SIZE);
        }

        tracing::info!(bill = %label, count = cosponsors.len(), "fetched cosponsors");
        Ok(cosponsors)
    }

    async fn search_members(
        &self,
        name: &str,
        filters: &MemberFilters,
    ) -> Result<Vec<Member>, CongressApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CongressApiError::InvalidRequest(
                "member name must not be empty".to_string(),
            ));
        }

        let mut params = vec![
            ("q", name.to_string()),
            ("limit", MEMBER_SEARCH_LIMIT.to_string()),
        ];
        if let Some(congress) = filters.congress {
            params.push(("congress", congress.to_string()));
        }
        if let Some(chamber) = filters.chamber {
            let chamber = match chamber {
                Chamber::House => "house",
                Chamber::Senate => "senate",
            };
            params.push(("chamber", chamber.to_string()));
        }
        if let Some(state) = &filters.state {
            params.push(("state", state.to_ascii_uppercase()));
        }

        let url = self.url("/member", &params)?;
        let response: MembersResponse = self.get_json(&url, name).await?;
        tracing::info!(query = name, count = response.members.len(), "member search complete");
        Ok(response.members)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Mock implementation for unit testing.

    use super::{
        Bill, BillType, CongressApiClient, CongressApiError, Cosponsor, Member, MemberFilters,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    type BillCall = (u16, BillType, u32);

    /// Mock implementation of `CongressApiClient` for unit tests.
    ///
    /// Configure responses with `set_*_result` methods and verify
    /// calls with the `*_calls()` recorders.
    pub struct MockCongressClient {
        get_bill_result: Mutex<Option<Result<Bill, CongressApiError>>>,
        list_cosponsors_result: Mutex<Option<Result<Vec<Cosponsor>, CongressApiError>>>,
        search_members_result: Mutex<Option<Result<Vec<Member>, CongressApiError>>>,
        get_bill_calls: Mutex<Vec<BillCall>>,
        list_cosponsors_calls: Mutex<Vec<BillCall>>,
        search_members_calls: Mutex<Vec<(String, MemberFilters)>>,
    }

    impl MockCongressClient {
        pub fn new() -> Self {
            Self {
                get_bill_result: Mutex::new(None),
                list_cosponsors_result: Mutex::new(None),
                search_members_result: Mutex::new(None),
                get_bill_calls: Mutex::new(Vec::new()),
                list_cosponsors_calls: Mutex::new(Vec::new()),
                search_members_calls: Mutex::new(Vec::new()),
            }
        }

        /// Set the result for `get_bill` calls.
        pub fn set_get_bill_result(&self, result: Result<Bill, CongressApiError>) {
            *self.get_bill_result.lock().unwrap() = Some(result);
        }

        /// Set the result for `list_cosponsors` calls.
        pub fn set_list_cosponsors_result(&self, result: Result<Vec<Cosponsor>, CongressApiError>) {
            *self.list_cosponsors_result.lock().unwrap() = Some(result);
        }

        /// Set the result for `search_members` calls.
        pub fn set_search_members_result(&self, result: Result<Vec<Member>, CongressApiError>) {
            *self.search_members_result.lock().unwrap() = Some(result);
        }

        pub fn get_bill_calls(&self) -> Vec<BillCall> {
            self.get_bill_calls.lock().unwrap().clone()
        }

        pub fn list_cosponsors_calls(&self) -> Vec<BillCall> {
            self.list_cosponsors_calls.lock().unwrap().clone()
        }

        /// Names and filters passed to `search_members`.
        pub fn search_members_calls(&self) -> Vec<(String, MemberFilters)> {
            self.search_members_calls.lock().unwrap().clone()
        }
    }

    impl Default for MockCongressClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl CongressApiClient for MockCongressClient {
        async fn get_bill(
            &self,
            congress: u16,
            bill_type: BillType,
            number: u32,
        ) -> Result<Bill, CongressApiError> {
            self.get_bill_calls
                .lock()
                .unwrap()
                .push((congress, bill_type, number));

            self.get_bill_result.lock().unwrap().take().unwrap_or_else(|| {
                Err(CongressApiError::NotFound(format!(
                    "{congress}-{bill_type}-{number}"
                )))
            })
        }

        async fn list_cosponsors(
            &self,
            congress: u16,
            bill_type: BillType,
            number: u32,
        ) -> Result<Vec<Cosponsor>, CongressApiError> {
            self.list_cosponsors_calls
                .lock()
                .unwrap()
                .push((congress, bill_type, number));

            self.list_cosponsors_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn search_members(
            &self,
            name: &str,
            filters: &MemberFilters,
        ) -> Result<Vec<Member>, CongressApiError> {
            self.search_members_calls
                .lock()
                .unwrap()
                .push((name.to_string(), filters.clone()));

            self.search_members_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}
