//! Outbound HTTP plumbing shared by the feed engine and the Congress.gov client.
//!
//! - [`Fetcher`] - GET with per-attempt timeout and bounded, jittered retries
//! - [`RateLimiter`] - requests-per-second ceiling (token bucket)
//! - [`ConcurrencyGate`] - ceiling on in-flight feed fetches
//! - [`DocumentSource`] - the seam the engine reads documents through

mod error;
mod fetcher;
mod gate;
mod rate_limit;
mod source;

pub use error::{FetchError, FetchErrorKind};
pub use fetcher::{FetchTask, Fetcher, RetryPolicy};
pub use gate::{ConcurrencyGate, GateError, GatePermit};
pub use rate_limit::{RateLimitError, RateLimiter};
pub use source::DocumentSource;

#[cfg(any(test, feature = "test-utils"))]
pub use source::mock;
