//! Canonical roll-call vote model shared by both chamber feeds.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Chamber of Congress a roll call was taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Chamber {
    House,
    Senate,
}

impl Chamber {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Senate => "Senate",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a chamber name is neither House nor Senate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chamber '{0}' (expected 'house' or 'senate')")]
pub struct UnknownChamber(pub String);

impl FromStr for Chamber {
    type Err = UnknownChamber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "house" | "h" => Ok(Self::House),
            "senate" | "s" => Ok(Self::Senate),
            _ => Err(UnknownChamber(s.to_string())),
        }
    }
}

/// A member's recorded position, reduced to the four canonical outcome labels.
///
/// Ordering follows the order the feeds print their totals in, which keeps
/// serialized tallies stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "Yea")]
    Yea,
    #[serde(rename = "Nay")]
    Nay,
    #[serde(rename = "Present")]
    Present,
    #[serde(rename = "Not Voting")]
    NotVoting,
}

impl Position {
    pub const ALL: [Self; 4] = [Self::Yea, Self::Nay, Self::Present, Self::NotVoting];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yea => "Yea",
            Self::Nay => "Nay",
            Self::Present => "Present",
            Self::NotVoting => "Not Voting",
        }
    }

    /// Map a feed's vote label onto a canonical position.
    ///
    /// The House prints "Aye"/"No" on recorded votes and the Senate prints
    /// "Guilty"/"Not Guilty" on impeachment articles. Returns `None` for any
    /// label with no canonical counterpart.
    #[must_use]
    pub fn from_label(raw: &str) -> Option<Self> {
        let label = raw.trim().to_ascii_lowercase();
        match label.as_str() {
            "yea" | "aye" | "guilty" => Some(Self::Yea),
            "nay" | "no" | "not guilty" => Some(Self::Nay),
            "not voting" => Some(Self::NotVoting),
            _ if label.starts_with("present") => Some(Self::Present),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome label → count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tally(BTreeMap<Position, u32>);

impl Tally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for `position`; labels never recorded count as zero.
    #[must_use]
    pub fn get(&self, position: Position) -> u32 {
        self.0.get(&position).copied().unwrap_or(0)
    }

    pub fn set(&mut self, position: Position, count: u32) {
        self.0.insert(position, count);
    }

    /// Add to a label's count, saturating at `u32::MAX`.
    pub fn add(&mut self, position: Position, count: u32) {
        let slot = self.0.entry(position).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Sum over all labels, widened so feed-supplied counts cannot overflow.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().map(|&count| u64::from(count)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, u32)> + '_ {
        self.0.iter().map(|(position, count)| (*position, *count))
    }

    /// Sum two tallies label by label, saturating like [`Tally::add`].
    pub fn merge(&mut self, other: &Self) {
        for (position, count) in other.iter() {
            self.add(position, count);
        }
    }

    /// Sum two tallies label by label.
    ///
    /// # Errors
    ///
    /// Returns the first label whose sum does not fit in a `u32`; `self` is
    /// left unchanged.
    pub fn checked_merge(&mut self, other: &Self) -> Result<(), Position> {
        let mut merged = self.0.clone();
        for (position, count) in other.iter() {
            let slot = merged.entry(position).or_insert(0);
            *slot = slot.checked_add(count).ok_or(position)?;
        }
        self.0 = merged;
        Ok(())
    }
}

impl FromIterator<(Position, u32)> for Tally {
    fn from_iter<I: IntoIterator<Item = (Position, u32)>>(iter: I) -> Self {
        let mut tally = Self::new();
        for (position, count) in iter {
            tally.add(position, count);
        }
        tally
    }
}

/// Party affiliation as printed by the feeds.
///
/// Serialized as its one-letter code; unrecognized labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Party {
    Democrat,
    Republican,
    Independent,
    Other(String),
}

impl Party {
    /// Parse a party code ("D") or party name ("Democratic"). Blank input is `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let party = match trimmed.to_ascii_lowercase().as_str() {
            "d" | "dem" | "democrat" | "democratic" | "democrats" => Self::Democrat,
            "r" | "rep" | "republican" | "republicans" => Self::Republican,
            "i" | "id" | "ind" | "independent" | "independents" | "independent democrat" => {
                Self::Independent
            }
            _ => Self::Other(trimmed.to_string()),
        };
        Some(party)
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Democrat => "D",
            Self::Republican => "R",
            Self::Independent => "I",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<Party> for String {
    fn from(party: Party) -> Self {
        party.code().to_string()
    }
}

impl From<String> for Party {
    fn from(raw: String) -> Self {
        Self::parse(&raw).unwrap_or(Self::Other(raw))
    }
}

/// Party → outcome counts.
pub type PartyTally = BTreeMap<Party, Tally>;

/// One member's position on one roll call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberVotePosition {
    /// Identifier as printed by the feed (House `name-id`, Senate `lis_member_id`).
    pub member_id: String,
    /// Canonical BioGuide id, when the feed or a roster join supplies one.
    pub bioguide_id: Option<String>,
    pub name: String,
    /// Party at the time of the vote. Absent when the feed omits it and no roster join resolved it.
    pub party: Option<Party>,
    pub state: Option<String>,
    pub position: Position,
}

impl MemberVotePosition {
    /// True when `id` names this member by feed id or BioGuide id (case-insensitive).
    #[must_use]
    pub fn matches(&self, id: &str) -> bool {
        let id = id.trim();
        self.member_id.eq_ignore_ascii_case(id)
            || self
                .bioguide_id
                .as_deref()
                .is_some_and(|bioguide| bioguide.eq_ignore_ascii_case(id))
    }
}

/// Kinds of legislation a roll call can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillType {
    Hr,
    S,
    Hres,
    Sres,
    Hjres,
    Sjres,
    Hconres,
    Sconres,
}

impl BillType {
    /// Parse a designation such as `"H.R."`, `"H J RES"` or `"S.Con.Res."`.
    #[must_use]
    pub fn from_designation(raw: &str) -> Option<Self> {
        let compact: String = raw
            .chars()
            .filter(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match compact.as_str() {
            "HR" => Some(Self::Hr),
            "S" => Some(Self::S),
            "HRES" => Some(Self::Hres),
            "SRES" => Some(Self::Sres),
            "HJRES" => Some(Self::Hjres),
            "SJRES" => Some(Self::Sjres),
            "HCONRES" => Some(Self::Hconres),
            "SCONRES" => Some(Self::Sconres),
            _ => None,
        }
    }

    /// Lowercase code used by the Congress.gov API paths.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Hr => "hr",
            Self::S => "s",
            Self::Hres => "hres",
            Self::Sres => "sres",
            Self::Hjres => "hjres",
            Self::Sjres => "sjres",
            Self::Hconres => "hconres",
            Self::Sconres => "sconres",
        }
    }
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Legislation a vote was taken on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillReference {
    pub congress: u16,
    pub bill_type: BillType,
    pub number: u32,
}

impl BillReference {
    /// Parse a full designation like `"H R 5"` or `"S.J.Res. 12"`.
    ///
    /// Returns `None` for procedural markers (`"QUORUM"`, `"MOTION"`) and
    /// anything else without a recognizable type and number.
    #[must_use]
    pub fn from_designation(congress: u16, raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let split = trimmed.find(|c: char| c.is_ascii_digit())?;
        let (designation, number) = trimmed.split_at(split);
        let bill_type = BillType::from_designation(designation)?;
        let number = number.trim().parse().ok()?;
        Some(Self {
            congress,
            bill_type,
            number,
        })
    }
}

impl fmt::Display for BillReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.congress, self.bill_type, self.number)
    }
}

/// Nomination a Senate vote confirmed or rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomineeReference {
    pub congress: u16,
    /// Presidential nomination number, e.g. `"PN20"`.
    pub number: String,
    /// Nominee and office as printed by the feed.
    pub description: Option<String>,
}

/// What a roll call was about, when the feed links it to something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssociatedItem {
    Bill(BillReference),
    Nomination(NomineeReference),
}

/// Vice-presidential tie-breaking vote (Senate only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieBreaker {
    pub by_whom: String,
    pub vote: String,
}

/// Identity of a roll call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteKey {
    pub chamber: Chamber,
    pub congress: u16,
    pub session: u8,
    pub roll: u32,
}

impl fmt::Display for VoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{} roll {}",
            self.chamber, self.congress, self.session, self.roll
        )
    }
}

/// A validated roll-call vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollCallVote {
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
    /// `None` when the feed carries no party breakdown; never zero-filled.
    pub party_tally: Option<PartyTally>,
    pub positions: Vec<MemberVotePosition>,
    pub associated_item: Option<AssociatedItem>,
    pub tie_breaker: Option<TieBreaker>,
}

impl RollCallVote {
    #[must_use]
    pub const fn key(&self) -> VoteKey {
        VoteKey {
            chamber: self.chamber,
            congress: self.congress,
            session: self.session,
            roll: self.roll,
        }
    }

    /// Tally recomputed from the member positions.
    #[must_use]
    pub fn position_tally(&self) -> Tally {
        self.positions.iter().map(|p| (p.position, 1)).collect()
    }
}

/// A single member's position together with the context of the roll call it was cast on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberVoteRecord {
    pub chamber: Chamber,
    pub congress: u16,
    pub session: u8,
    pub roll: u32,
    pub date: NaiveDate,
    pub question: String,
    pub result: String,
    pub associated_item: Option<AssociatedItem>,
    pub member_position: MemberVotePosition,
}

impl MemberVoteRecord {
    #[must_use]
    pub fn new(vote: &RollCallVote, member_position: MemberVotePosition) -> Self {
        Self {
            chamber: vote.chamber,
            congress: vote.congress,
            session: vote.session,
            roll: vote.roll,
            date: vote.date,
            question: vote.question.clone(),
            result: vote.result.clone(),
            associated_item: vote.associated_item.clone(),
            member_position,
        }
    }
}
