//! Where roll-call documents come from.

use async_trait::async_trait;

use super::error::FetchError;
use super::fetcher::Fetcher;

/// Byte source for feed documents.
///
/// [`Fetcher`] is the production implementation; tests swap in
/// [`mock::MockDocumentSource`].
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl DocumentSource for Fetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Self::get(self, url).await
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
    //! In-memory document source for engine tests.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::DocumentSource;
    use crate::fetch::{FetchError, FetchErrorKind};

    /// Serves canned responses by URL and records every request.
    ///
    /// Unknown URLs answer HTTP 404. An optional delay makes requests stay in
    /// flight long enough to observe concurrency and cancellation.
    pub struct MockDocumentSource {
        responses: Mutex<HashMap<String, Result<Vec<u8>, FetchError>>>,
        delay: Mutex<Option<Duration>>,
        calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    struct InFlight<'a>(&'a AtomicUsize);

    impl Drop for InFlight<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl MockDocumentSource {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                delay: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        /// Serve `body` for `url`.
        pub fn set_document(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.into(), Ok(body.into()));
        }

        /// Fail `url` with the given error kind.
        pub fn set_error(&self, url: impl Into<String>, kind: FetchErrorKind) {
            let url = url.into();
            let err = FetchError::new(url.clone(), 1, kind);
            self.responses.lock().unwrap().insert(url, Err(err));
        }

        /// Hold every request for `delay` before answering.
        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        /// URLs requested so far, in call order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn in_flight(&self) -> usize {
            self.in_flight.load(Ordering::SeqCst)
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    impl Default for MockDocumentSource {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl DocumentSource for MockDocumentSource {
        async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _guard = InFlight(&self.in_flight);

            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::new(url, 1, FetchErrorKind::HttpStatus(404))))
        }
    }
}
