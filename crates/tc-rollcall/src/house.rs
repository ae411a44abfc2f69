//! House Clerk EVS roll-call parser.
//!
//! Layout of an EVS document:
//!
//! ```text
//! rollcall-vote
//! ├── vote-metadata
//! │   ├── congress, session ("1st"), rollcall-num, legis-num
//! │   ├── vote-question, vote-type, vote-result, action-date ("9-Jan-2023")
//! │   └── vote-totals
//! │       ├── totals-by-party*   (absent in older records)
//! │       └── totals-by-vote
//! └── vote-data
//!     └── recorded-vote*
//!         ├── legislator[@name-id, @party, @state]
//!         └── vote ("Yea" | "Aye" | "No" | "Nay" | "Present" | "Not Voting")
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use roxmltree::Node;

use crate::error::{ParseError, ParseErrorKind};
use crate::model::{
    AssociatedItem, BillReference, Chamber, MemberVotePosition, Party, PartyTally, Position, Tally,
};
use crate::parser::{ChamberParser, ParsedVote, PartyBreakdown};
use crate::xml;

const DATE_FORMATS: &[&str] = &["%d-%b-%Y", "%e-%b-%Y", "%Y-%m-%d", "%B %d, %Y"];

/// Parser for the House Clerk's Electronic Voting System feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HouseParser;

impl HouseParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ChamberParser for HouseParser {
    fn chamber(&self) -> Chamber {
        Chamber::House
    }

    fn parse(&self, xml: &[u8]) -> Result<ParsedVote, ParseError> {
        parse_document(xml).map_err(|kind| ParseError::new(Chamber::House, kind))
    }
}

fn parse_document(bytes: &[u8]) -> Result<ParsedVote, ParseErrorKind> {
    let text = xml::decode(bytes);
    let doc = xml::parse(&text)?;
    let root = doc.root_element();

    let meta = xml::descendant(root, "vote-metadata")
        .ok_or(ParseErrorKind::MissingField("vote-metadata"))?;

    let congress: u16 = xml::required_number(xml::child_text(meta, "congress"), "congress")?;
    let session: u8 = xml::required_number(xml::child_text(meta, "session"), "session")?;
    let roll: u32 = xml::required_number(xml::child_text(meta, "rollcall-num"), "roll")?;

    let result =
        xml::child_text_non_empty(meta, "vote-result").ok_or(ParseErrorKind::MissingField("result"))?;
    let date_raw =
        xml::child_text_non_empty(meta, "action-date").ok_or(ParseErrorKind::MissingField("date"))?;
    let date = parse_date(&date_raw)?;

    let question = xml::child_text(meta, "vote-question").unwrap_or_default();
    if question.is_empty() {
        tracing::debug!(roll, "House vote has no vote-question text");
    }
    let vote_type = xml::child_text_non_empty(meta, "vote-type");

    let associated_item = xml::child_text_non_empty(meta, "legis-num")
        .and_then(|legis| BillReference::from_designation(congress, &legis))
        .map(AssociatedItem::Bill);

    let totals = xml::child(meta, "vote-totals").ok_or(ParseErrorKind::MissingField("totals"))?;
    let by_vote =
        xml::child(totals, "totals-by-vote").ok_or(ParseErrorKind::MissingField("totals"))?;
    let tally = read_totals(by_vote, "totals-by-vote")?;
    let party_breakdown = read_party_totals(totals)?;

    let positions = match xml::descendant(root, "vote-data") {
        Some(data) => xml::children(data, "recorded-vote")
            .map(read_recorded_vote)
            .collect::<Result<Vec<_>, _>>()?,
        None => {
            tracing::debug!(roll, "House vote has no vote-data section");
            Vec::new()
        }
    };

    tracing::debug!(
        congress,
        session,
        roll,
        positions = positions.len(),
        "parsed House roll call"
    );

    Ok(ParsedVote {
        chamber: Chamber::House,
        congress,
        session,
        roll,
        date,
        question,
        result,
        vote_type,
        majority_requirement: None,
        tally,
        party_breakdown,
        positions,
        associated_item,
        tie_breaker: None,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, ParseErrorKind> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| ParseErrorKind::MalformedField {
            field: "date",
            value: raw.to_string(),
        })
}

/// Read one totals row. Recorded votes print `aye`/`no` in some years.
fn read_totals(node: Node<'_, '_>, context: &str) -> Result<Tally, ParseErrorKind> {
    let field = |name: &str| format!("{context}/{name}");
    let mut tally = Tally::new();
    tally.set(
        Position::Yea,
        xml::count(xml::child_any(node, &["yea-total", "aye-total"]), &field("yea-total"))?,
    );
    tally.set(
        Position::Nay,
        xml::count(xml::child_any(node, &["nay-total", "no-total"]), &field("nay-total"))?,
    );
    tally.set(
        Position::Present,
        xml::count(xml::child(node, "present-total"), &field("present-total"))?,
    );
    tally.set(
        Position::NotVoting,
        xml::count(xml::child(node, "not-voting-total"), &field("not-voting-total"))?,
    );
    Ok(tally)
}

fn read_party_totals(totals: Node<'_, '_>) -> Result<PartyBreakdown, ParseErrorKind> {
    let mut parties: PartyTally = BTreeMap::new();
    let mut seen_any = false;
    for row in xml::children(totals, "totals-by-party") {
        seen_any = true;
        let label = xml::child_text(row, "party").unwrap_or_default();
        let party = Party::parse(&label).ok_or_else(|| ParseErrorKind::MalformedField {
            field: "party",
            value: label.clone(),
        })?;
        let counts = read_totals(row, "totals-by-party")?;
        parties
            .entry(party)
            .or_default()
            .checked_merge(&counts)
            .map_err(|position| ParseErrorKind::MalformedTally {
                field: format!("totals-by-party {position}"),
                value: "sum exceeds u32".to_string(),
            })?;
    }
    Ok(if seen_any {
        PartyBreakdown::Reported(parties)
    } else {
        PartyBreakdown::Absent
    })
}

fn read_recorded_vote(record: Node<'_, '_>) -> Result<MemberVotePosition, ParseErrorKind> {
    let legislator =
        xml::child(record, "legislator").ok_or(ParseErrorKind::MissingField("legislator"))?;

    let raw_vote = xml::child_text(record, "vote").unwrap_or_default();
    let position = Position::from_label(&raw_vote).ok_or(ParseErrorKind::MalformedField {
        field: "vote",
        value: raw_vote,
    })?;

    let name = xml::attr(legislator, "unaccented-name")
        .map(str::to_string)
        .unwrap_or_else(|| xml::text(legislator));
    let name_id = xml::attr(legislator, "name-id");
    let member_id = name_id.map_or_else(|| name.clone(), str::to_string);
    let bioguide_id = name_id.filter(|id| looks_like_bioguide(id)).map(str::to_string);

    Ok(MemberVotePosition {
        member_id,
        bioguide_id,
        name,
        party: xml::attr(legislator, "party").and_then(Party::parse),
        state: xml::attr(legislator, "state").map(str::to_string),
        position,
    })
}

/// BioGuide ids are one letter followed by six digits, e.g. `A000370`.
fn looks_like_bioguide(id: &str) -> bool {
    let mut chars = id.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && id.len() == 7
        && chars.all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(meta_extra: &str, votes: &str) -> String {
        format!(
            r#"<rollcall-vote>
  <vote-metadata>
    <congress>118</congress>
    <session>1st</session>
    <rollcall-num>42</rollcall-num>
    <vote-question>On Motion to Adjourn</vote-question>
    <vote-result>Failed</vote-result>
    <action-date>1-Feb-2023</action-date>
    {meta_extra}
    <vote-totals>
      <totals-by-vote>
        <yea-total>1</yea-total><nay-total>1</nay-total><present-total/><not-voting-total>0</not-voting-total>
      </totals-by-vote>
    </vote-totals>
  </vote-metadata>
  <vote-data>{votes}</vote-data>
</rollcall-vote>"#
        )
    }

    const TWO_VOTES: &str = r#"
    <recorded-vote><legislator name-id="A000370" party="D" state="NC">Adams</legislator><vote>Aye</vote></recorded-vote>
    <recorded-vote><legislator name-id="B001297" party="R" state="CO">Buck</legislator><vote>No</vote></recorded-vote>"#;

    #[test]
    fn parses_minimal_document() {
        let parsed = HouseParser.parse(minimal("", TWO_VOTES).as_bytes()).expect("should parse");
        assert_eq!(parsed.congress, 118);
        assert_eq!(parsed.session, 1);
        assert_eq!(parsed.roll, 42);
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2023, 2, 1).expect("valid date"));
        assert_eq!(parsed.question, "On Motion to Adjourn");
        assert_eq!(parsed.tally.get(Position::Yea), 1);
        assert_eq!(parsed.tally.get(Position::Present), 0);
        assert_eq!(parsed.positions[0].position, Position::Yea);
        assert_eq!(parsed.positions[1].position, Position::Nay);
        assert_eq!(parsed.positions[0].bioguide_id.as_deref(), Some("A000370"));
        assert_eq!(parsed.party_breakdown, PartyBreakdown::Absent);
        assert!(parsed.associated_item.is_none());
    }

    #[test]
    fn legis_num_becomes_bill_reference() {
        let parsed = HouseParser
            .parse(minimal("<legis-num>H R 21</legis-num>", TWO_VOTES).as_bytes())
            .expect("should parse");
        let Some(AssociatedItem::Bill(bill)) = parsed.associated_item else {
            panic!("expected a bill reference");
        };
        assert_eq!(bill.number, 21);
        assert_eq!(bill.congress, 118);
    }

    #[test]
    fn unknown_vote_label_is_malformed_field() {
        let votes = r#"<recorded-vote><legislator name-id="A000370">Adams</legislator><vote>Maybe</vote></recorded-vote>"#;
        let err = HouseParser.parse(minimal("", votes).as_bytes())
            .expect_err("should fail to parse");
        assert_eq!(
            err.kind,
            ParseErrorKind::MalformedField {
                field: "vote",
                value: "Maybe".into()
            }
        );
    }

    #[test]
    fn missing_legislator_is_reported() {
        let votes = "<recorded-vote><vote>Yea</vote></recorded-vote>";
        let err = HouseParser.parse(minimal("", votes).as_bytes())
            .expect_err("should fail to parse");
        assert_eq!(err.kind, ParseErrorKind::MissingField("legislator"));
    }

    #[test]
    fn legacy_member_without_name_id_uses_name() {
        let votes = r#"<recorded-vote><legislator party="D" state="NY">Smith (NY)</legislator><vote>Yea</vote></recorded-vote>"#;
        let parsed = HouseParser.parse(minimal("", votes).as_bytes()).expect("should parse");
        assert_eq!(parsed.positions[0].member_id, "Smith (NY)");
        assert!(parsed.positions[0].bioguide_id.is_none());
    }

    #[test]
    fn malformed_date_is_reported() {
        let doc = minimal("", TWO_VOTES).replace("1-Feb-2023", "sometime");
        let err = HouseParser.parse(doc.as_bytes()).expect_err("should fail to parse");
        assert!(matches!(
            err.kind,
            ParseErrorKind::MalformedField { field: "date", .. }
        ));
    }

    #[test]
    fn bioguide_shape() {
        assert!(looks_like_bioguide("A000370"));
        assert!(!looks_like_bioguide("S354"));
        assert!(!looks_like_bioguide("0000370"));
    }
}
