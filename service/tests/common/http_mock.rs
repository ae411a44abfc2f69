//! HTTP mock server helpers for testing outbound HTTP calls.
//!
//! This module provides a thin wrapper around `wiremock` for declarative
//! HTTP stubbing. Use it to mock the chamber feeds and Congress.gov in
//! integration tests.
//!
//! # Quick Start
//!
//! ```ignore
//! use crate::common::http_mock::MockHttpServer;
//!
//! #[tokio::test]
//! async fn test_external_api_call() {
//!     let server = MockHttpServer::start().await;
//!
//!     server
//!         .expect_get("/bill/118/hr/815")
//!         .respond_with_json(json!({"bill": {}}))
//!         .expect_times(1)
//!         .mount()
//!         .await;
//!
//!     // Point the client at server.url()
//! }
//! ```
//!
//! # Patterns
//!
//! - **Success response**: `.respond_with_json(value)` or `.respond_with_bytes(body, type)`
//! - **Error response**: `.respond_with_status(500)`, optionally `.with_json_response(body)`
//! - **Timeout simulation**: `.respond_with_delay(Duration::from_secs(30))`
//! - **Transient failure**: `.up_to_n_times(1)` mounted before the success stub
//! - **Request verification**: `.expect_times(1)`, checked when the server drops

use std::time::Duration;

pub use wiremock::matchers::{header, method, path, query_param};
pub use wiremock::MockServer as WiremockServer;
pub use wiremock::{Mock, ResponseTemplate};

/// A running stub server.
pub struct MockHttpServer {
    server: WiremockServer,
}

impl MockHttpServer {
    pub async fn start() -> Self {
        Self {
            server: WiremockServer::start().await,
        }
    }

    /// Base URL, without a trailing slash.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    pub fn inner(&self) -> &WiremockServer {
        &self.server
    }

    /// Begin stubbing `GET {path}`.
    pub fn expect_get(&self, path: &str) -> MockBuilder<'_> {
        MockBuilder {
            server: &self.server,
            path: path.to_string(),
            headers: Vec::new(),
            query: Vec::new(),
            response: ResponseTemplate::new(200),
            times: None,
            up_to: None,
        }
    }

    /// Paths of every request received so far, in arrival order.
    pub async fn received_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }

    /// Check every `expect_times` expectation now rather than on drop.
    pub async fn verify(&self) {
        self.server.verify().await;
    }
}

/// Builder for one stubbed route.
pub struct MockBuilder<'a> {
    server: &'a WiremockServer,
    path: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    response: ResponseTemplate,
    times: Option<u64>,
    up_to: Option<u64>,
}

impl MockBuilder<'_> {
    /// Only match requests carrying this header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Only match requests carrying this query parameter.
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn respond_with_json(mut self, body: serde_json::Value) -> Self {
        self.response = ResponseTemplate::new(200).set_body_json(body);
        self
    }

    pub fn respond_with_bytes(mut self, body: &[u8], content_type: &str) -> Self {
        self.response = ResponseTemplate::new(200).set_body_raw(body.to_vec(), content_type);
        self
    }

    pub fn respond_with_status(mut self, status: u16) -> Self {
        self.response = ResponseTemplate::new(status);
        self
    }

    /// Attach a JSON body to the current response (e.g. after `respond_with_status`).
    pub fn with_json_response(mut self, body: serde_json::Value) -> Self {
        self.response = self.response.set_body_json(body);
        self
    }

    pub fn respond_with_delay(mut self, delay: Duration) -> Self {
        self.response = self.response.set_delay(delay);
        self
    }

    /// Fail verification unless the route is hit exactly `n` times.
    pub fn expect_times(mut self, n: u64) -> Self {
        self.times = Some(n);
        self
    }

    /// Stop matching after `n` hits so a later stub can take over.
    pub fn up_to_n_times(mut self, n: u64) -> Self {
        self.up_to = Some(n);
        self
    }

    pub async fn mount(self) {
        let mut mock = Mock::given(method("GET")).and(path(self.path.as_str()));
        for (name, value) in &self.headers {
            mock = mock.and(header(name.as_str(), value.as_str()));
        }
        for (key, value) in &self.query {
            mock = mock.and(query_param(key.as_str(), value.as_str()));
        }

        let mut mock = mock.respond_with(self.response);
        if let Some(n) = self.up_to {
            mock = mock.up_to_n_times(n);
        }
        if let Some(n) = self.times {
            mock = mock.expect(n);
        }
        mock.mount(self.server).await;
    }
}
