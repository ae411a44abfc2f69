use thiserror::Error;

/// Why a fetch gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchErrorKind {
    /// Connection, TLS or body read failure.
    #[error("network error: {0}")]
    Network(String),

    /// The per-attempt deadline elapsed.
    #[error("request timed out")]
    Timeout,

    /// Non-success status other than 429.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// HTTP 429, or no local rate-limit capacity within the allowed wait.
    #[error("rate limited")]
    RateLimited,
}

impl FetchErrorKind {
    /// Whether another attempt could succeed: timeouts, connection errors,
    /// 5xx and 429 are transient, any other 4xx is permanent.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout | Self::RateLimited => true,
            Self::HttpStatus(code) => *code >= 500,
        }
    }
}

/// A GET that failed after the retry policy ran its course.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("GET {url} failed after {attempts} attempt(s): {kind}")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    pub kind: FetchErrorKind,
}

impl FetchError {
    #[must_use]
    pub fn new(url: impl Into<String>, attempts: u32, kind: FetchErrorKind) -> Self {
        Self {
            url: url.into(),
            attempts,
            kind,
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self.kind {
            FetchErrorKind::HttpStatus(code) => Some(code),
            FetchErrorKind::RateLimited => Some(429),
            _ => None,
        }
    }

    /// The feeds answer 404 for roll numbers that were never taken.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, FetchErrorKind::HttpStatus(404))
    }
}

impl From<reqwest::Error> for FetchErrorKind {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl FetchErrorKind {
    #[must_use]
    pub const fn from_status(code: u16) -> Self {
        if code == 429 {
            Self::RateLimited
        } else {
            Self::HttpStatus(code)
        }
    }
}
