use tc_rollcall::{ParseError, ValidationError};
use thiserror::Error;

use crate::fetch::FetchError;

/// Errors from [`super::VoteEngine`] calls.
///
/// All but `InvalidIdentifier` are scoped to one roll: in a member batch they
/// surface as that roll's `Failed` outcome while the other rolls proceed.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("roll {roll}: {source}")]
    Parse { roll: u32, source: ParseError },

    #[error("roll {roll}: {source}")]
    Validation { roll: u32, source: ValidationError },

    #[error("roll {roll}: {what} not found")]
    NotFound { roll: u32, what: String },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl EngineError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }
}
