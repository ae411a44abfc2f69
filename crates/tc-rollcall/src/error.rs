//! Parse and validation errors.

use std::fmt;

use crate::model::{Chamber, Position, VoteKey};

/// A feed document could not be turned into a vote record.
///
/// Parsing is deterministic, so the same bytes always fail the same way;
/// callers should never retry on this error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{chamber} feed: {kind}")]
pub struct ParseError {
    pub chamber: Chamber,
    pub kind: ParseErrorKind,
}

impl ParseError {
    #[must_use]
    pub const fn new(chamber: Chamber, kind: ParseErrorKind) -> Self {
        Self { chamber, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("malformed tally count '{field}': {value:?}")]
    MalformedTally { field: String, value: String },

    #[error("malformed field '{field}': {value:?}")]
    MalformedField { field: &'static str, value: String },

    #[error("unsupported vote subtype '{0}'")]
    UnsupportedVoteSubtype(String),
}

/// Where a reconciled count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallySource {
    MemberPositions,
    PartyTally,
}

impl fmt::Display for TallySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MemberPositions => f.write_str("member positions"),
            Self::PartyTally => f.write_str("party tally"),
        }
    }
}

/// One outcome label whose summed count disagrees with the overall tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    pub source: TallySource,
    pub position: Position,
    /// Overall tally as printed by the feed.
    pub expected: u32,
    /// Sum over `source`, widened so overflowing feed counts still compare.
    pub actual: u64,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sum to {} {} but the overall tally says {}",
            self.source, self.actual, self.position, self.expected
        )
    }
}

fn join(discrepancies: &[Discrepancy]) -> String {
    discrepancies
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A parsed record is internally inconsistent.
///
/// The feed is authoritative, so nothing is repaired: the discrepancy is
/// reported as-is for a human to judge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{key}: tally does not reconcile: {}", join(.discrepancies))]
    TallyMismatch {
        key: VoteKey,
        discrepancies: Vec<Discrepancy>,
    },

    #[error("{key}: member '{member_id}' appears more than once")]
    DuplicateMember { key: VoteKey, member_id: String },

    #[error("requested {expected} but the feed returned {actual}")]
    IdentityMismatch { expected: VoteKey, actual: VoteKey },
}
