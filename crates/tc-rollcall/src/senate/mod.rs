//! Senate LIS roll-call parser.
//!
//! Layout of an LIS document:
//!
//! ```text
//! roll_call_vote
//! ├── congress, session (1 | 2), vote_number, vote_date ("January 24, 2025,  09:07 PM")
//! ├── vote_question_text | question, vote_result | vote_result_text, majority_requirement
//! ├── document (document_type "PN" | "S." | "H.R." | ..., document_number, document_name, document_title)
//! ├── amendment (amendment_to_document_number)
//! ├── count (yeas, nays, present, absent) + tie_breaker (by_whom, tie_breaker_vote)
//! ├── party_counts?  aggregate per-party blocks, when the file carries them
//! └── members
//!     └── member* (member_full, lis_member_id, party?, state, vote_cast)
//! ```

mod roster;

pub use roster::{RosterEntry, SenateRoster};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use roxmltree::Node;

use crate::error::{ParseError, ParseErrorKind};
use crate::model::{
    AssociatedItem, BillReference, BillType, Chamber, MemberVotePosition, NomineeReference, Party,
    PartyTally, Position, Tally, TieBreaker,
};
use crate::parser::{ChamberParser, ParsedVote, PartyBreakdown};
use crate::xml;

/// Parser for the Senate Legislative Information System feed.
///
/// When built with a roster, members whose vote entry lacks a party or state
/// are filled in from it and every joined member gains a BioGuide id. Without
/// a roster such members keep `party: None`.
#[derive(Debug, Clone, Default)]
pub struct SenateParser {
    roster: Option<Arc<SenateRoster>>,
}

impl SenateParser {
    #[must_use]
    pub const fn new() -> Self {
        Self { roster: None }
    }

    #[must_use]
    pub const fn with_roster(roster: Arc<SenateRoster>) -> Self {
        Self {
            roster: Some(roster),
        }
    }

    #[must_use]
    pub fn roster(&self) -> Option<&SenateRoster> {
        self.roster.as_deref()
    }
}

impl ChamberParser for SenateParser {
    fn chamber(&self) -> Chamber {
        Chamber::Senate
    }

    fn parse(&self, xml: &[u8]) -> Result<ParsedVote, ParseError> {
        parse_document(xml, self.roster())
            .map_err(|kind| ParseError::new(Chamber::Senate, kind))
    }
}

fn parse_document(
    bytes: &[u8],
    roster: Option<&SenateRoster>,
) -> Result<ParsedVote, ParseErrorKind> {
    let text = xml::decode(bytes);
    let doc = xml::parse(&text)?;
    let root = doc.root_element();

    let congress: u16 = xml::required_number(xml::child_text(root, "congress"), "congress")?;
    let session: u8 = xml::required_number(xml::child_text(root, "session"), "session")?;
    let roll: u32 = xml::required_number(xml::child_text(root, "vote_number"), "roll")?;

    let date_raw =
        xml::child_text_non_empty(root, "vote_date").ok_or(ParseErrorKind::MissingField("date"))?;
    let date = parse_date(&date_raw)?;
    let result = xml::first_text(root, &["vote_result", "vote_result_text"])
        .ok_or(ParseErrorKind::MissingField("result"))?;
    let question = xml::first_text(root, &["vote_question_text", "question"]).unwrap_or_default();
    let majority_requirement = xml::child_text_non_empty(root, "majority_requirement");

    let associated_item = classify(root, congress)?;

    let count = xml::child(root, "count").ok_or(ParseErrorKind::MissingField("totals"))?;
    let tally = read_counts(count, "count")?;
    let tie_breaker = read_tie_breaker(root);

    let party_breakdown = match read_party_counts(root)? {
        Some(parties) => PartyBreakdown::Reported(parties),
        None => PartyBreakdown::FromMembers,
    };

    let positions = match xml::child(root, "members") {
        Some(members) => xml::children(members, "member")
            .map(|member| read_member(member, roster))
            .collect::<Result<Vec<_>, _>>()?,
        None => {
            tracing::debug!(roll, "Senate vote has no members section");
            Vec::new()
        }
    };

    let unresolved_party = positions.iter().filter(|p| p.party.is_none()).count();
    if unresolved_party > 0 {
        tracing::debug!(
            roll,
            unresolved_party,
            roster = roster.is_some(),
            "Senate members left without a party"
        );
    }

    Ok(ParsedVote {
        chamber: Chamber::Senate,
        congress,
        session,
        roll,
        date,
        question,
        result,
        vote_type: None,
        majority_requirement,
        tally,
        party_breakdown,
        positions,
        associated_item,
        tie_breaker,
    })
}

/// `"January 24, 2025,  09:07 PM"` → 2025-01-24. The time of day is dropped.
fn parse_date(raw: &str) -> Result<NaiveDate, ParseErrorKind> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let candidate = match parts.as_slice() {
        [month_day, year, ..] => format!("{month_day} {year}"),
        _ => raw.trim().to_string(),
    };
    NaiveDate::parse_from_str(&candidate, "%B %d %Y")
        .or_else(|_| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d"))
        .map_err(|_| ParseErrorKind::MalformedField {
            field: "date",
            value: raw.to_string(),
        })
}

fn read_counts(node: Node<'_, '_>, context: &str) -> Result<Tally, ParseErrorKind> {
    let field = |name: &str| format!("{context}/{name}");
    let mut tally = Tally::new();
    tally.set(Position::Yea, xml::count(xml::child(node, "yeas"), &field("yeas"))?);
    tally.set(Position::Nay, xml::count(xml::child(node, "nays"), &field("nays"))?);
    tally.set(
        Position::Present,
        xml::count(xml::child(node, "present"), &field("present"))?,
    );
    tally.set(
        Position::NotVoting,
        xml::count(xml::child(node, "absent"), &field("absent"))?,
    );
    Ok(tally)
}

fn read_tie_breaker(root: Node<'_, '_>) -> Option<TieBreaker> {
    let block = xml::descendant(root, "tie_breaker")?;
    let by_whom = xml::child_text_non_empty(block, "by_whom")?;
    let vote = xml::child_text_non_empty(block, "tie_breaker_vote")?;
    Some(TieBreaker { by_whom, vote })
}

/// Aggregate party blocks. A block names its party by `name` attribute, a
/// `party_name` child, or its own tag (`<democratic>`).
fn read_party_counts(root: Node<'_, '_>) -> Result<Option<PartyTally>, ParseErrorKind> {
    let Some(block) = xml::child_any(root, &["party_counts", "party_tally"]) else {
        return Ok(None);
    };
    let mut parties: PartyTally = BTreeMap::new();
    for row in block.children().filter(Node::is_element) {
        let tag = row.tag_name().name();
        let label = xml::attr(row, "name")
            .map(str::to_string)
            .or_else(|| xml::child_text_non_empty(row, "party_name"))
            .or_else(|| (!tag.eq_ignore_ascii_case("party")).then(|| tag.to_string()));
        let party = label
            .as_deref()
            .and_then(Party::parse)
            .ok_or_else(|| ParseErrorKind::MalformedField {
                field: "party",
                value: label.clone().unwrap_or_default(),
            })?;
        let counts = read_counts(row, "party_counts")?;
        parties
            .entry(party)
            .or_default()
            .checked_merge(&counts)
            .map_err(|position| ParseErrorKind::MalformedTally {
                field: format!("party_counts {position}"),
                value: "sum exceeds u32".to_string(),
            })?;
    }
    Ok(Some(parties))
}

fn is_nomination(document_type: &str) -> bool {
    document_type
        .chars()
        .filter(char::is_ascii_alphabetic)
        .collect::<String>()
        .eq_ignore_ascii_case("PN")
}

/// Work out what the vote was on from the `document` and `amendment` blocks.
fn classify(root: Node<'_, '_>, congress: u16) -> Result<Option<AssociatedItem>, ParseErrorKind> {
    let document = xml::child(root, "document");
    let document_type = document.and_then(|d| xml::child_text_non_empty(d, "document_type"));

    let (Some(document), Some(document_type)) = (document, document_type) else {
        // Amendment votes sometimes leave the document block empty and only
        // name the amended measure.
        return Ok(xml::child(root, "amendment")
            .and_then(|a| xml::child_text_non_empty(a, "amendment_to_document_number"))
            .and_then(|target| BillReference::from_designation(congress, &target))
            .map(AssociatedItem::Bill));
    };

    let document_congress = xml::child_text(document, "document_congress")
        .and_then(|c| xml::leading_number(&c))
        .unwrap_or(congress);
    let document_number = xml::child_text_non_empty(document, "document_number");

    if is_nomination(&document_type) {
        let number = xml::child_text_non_empty(document, "document_name")
            .or_else(|| document_number.map(|n| format!("PN{n}")))
            .ok_or(ParseErrorKind::MissingField("document_number"))?;
        return Ok(Some(AssociatedItem::Nomination(NomineeReference {
            congress: document_congress,
            number,
            description: xml::child_text_non_empty(document, "document_title"),
        })));
    }

    let Some(bill_type) = BillType::from_designation(&document_type) else {
        return Err(ParseErrorKind::UnsupportedVoteSubtype(document_type));
    };
    let raw_number = document_number.ok_or(ParseErrorKind::MissingField("document_number"))?;
    let number = xml::leading_number(&raw_number).ok_or(ParseErrorKind::MalformedField {
        field: "document_number",
        value: raw_number,
    })?;
    Ok(Some(AssociatedItem::Bill(BillReference {
        congress: document_congress,
        bill_type,
        number,
    })))
}

fn read_member(
    member: Node<'_, '_>,
    roster: Option<&SenateRoster>,
) -> Result<MemberVotePosition, ParseErrorKind> {
    let raw_vote = xml::child_text(member, "vote_cast").unwrap_or_default();
    let position = Position::from_label(&raw_vote).ok_or(ParseErrorKind::MalformedField {
        field: "vote_cast",
        value: raw_vote,
    })?;

    let name = xml::child_text_non_empty(member, "member_full").unwrap_or_else(|| {
        let first = xml::child_text(member, "first_name").unwrap_or_default();
        let last = xml::child_text(member, "last_name").unwrap_or_default();
        format!("{first} {last}").trim().to_string()
    });
    let lis_member_id = xml::child_text_non_empty(member, "lis_member_id");
    let entry = lis_member_id
        .as_deref()
        .and_then(|id| roster.and_then(|r| r.get(id)));

    Ok(MemberVotePosition {
        member_id: lis_member_id.unwrap_or_else(|| name.clone()),
        bioguide_id: xml::child_text_non_empty(member, "bioguide_id")
            .or_else(|| entry.and_then(|e| e.bioguide_id.clone())),
        name,
        party: xml::child_text(member, "party")
            .and_then(|p| Party::parse(&p))
            .or_else(|| entry.and_then(|e| e.party.clone())),
        state: xml::child_text_non_empty(member, "state")
            .or_else(|| entry.and_then(|e| e.state.clone())),
        position,
    })
}
