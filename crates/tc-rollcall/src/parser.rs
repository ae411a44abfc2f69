//! The chamber parser capability and the intermediate record it produces.

use chrono::NaiveDate;

use crate::error::ParseError;
use crate::model::{
    AssociatedItem, Chamber, MemberVotePosition, PartyTally, Tally, TieBreaker,
};

/// How a parsed document describes its party breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartyBreakdown {
    /// The feed printed per-party totals.
    Reported(PartyTally),
    /// No per-party totals; derive them from member parties if every member has one.
    FromMembers,
    /// The feed has no party breakdown for this vote.
    Absent,
}

/// Chamber-specific parse output, prior to reconciliation by [`crate::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVote {
    pub chamber: Chamber,
    pub congress: u16,
    pub session: u8,
    pub roll: u32,
    pub date: NaiveDate,
    pub question: String,
    pub result: String,
    pub vote_type: Option<String>,
    pub majority_requirement: Option<String>,
    pub tally: Tally,
    pub party_breakdown: PartyBreakdown,
    pub positions: Vec<MemberVotePosition>,
    pub associated_item: Option<AssociatedItem>,
    pub tie_breaker: Option<TieBreaker>,
}

/// Turns one chamber's raw roll-call XML into a [`ParsedVote`].
///
/// Each feed gets its own implementation. The two schemas share nothing
/// beyond the output type.
pub trait ChamberParser: Send + Sync {
    fn chamber(&self) -> Chamber;

    /// Parse one roll-call document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the document is not well-formed XML, lacks a
    /// required field, or carries counts or labels that cannot be interpreted.
    fn parse(&self, xml: &[u8]) -> Result<ParsedVote, ParseError>;
}
