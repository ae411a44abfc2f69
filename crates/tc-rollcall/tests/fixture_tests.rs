//! Parsing and validation against recorded feed documents.

use std::sync::Arc;

use tc_rollcall::{
    normalize, AssociatedItem, BillReference, BillType, Chamber, ChamberParser, HouseParser,
    MemberPositionIndex, Party, ParseErrorKind, Position, SenateParser, SenateRoster,
    TallySource, ValidationError,
};

const HOUSE_2023_ROLL_6: &[u8] = include_bytes!("fixtures/house_2023_roll006.xml");
const HOUSE_LEGACY: &[u8] = include_bytes!("fixtures/house_1995_legacy.xml");
const HOUSE_QUORUM: &[u8] = include_bytes!("fixtures/house_quorum.xml");
const HOUSE_MISSING_ROLL: &[u8] = include_bytes!("fixtures/house_missing_rollcall.xml");
const HOUSE_MALFORMED_TALLY: &[u8] = include_bytes!("fixtures/house_malformed_tally.xml");
const HOUSE_TALLY_MISMATCH: &[u8] = include_bytes!("fixtures/house_tally_mismatch.xml");
const SENATE_NOMINATION: &[u8] = include_bytes!("fixtures/senate_119_1_00011_nomination.xml");
const SENATE_AMENDMENT: &[u8] = include_bytes!("fixtures/senate_119_1_00005_amendment.xml");
const SENATE_PARTY_COUNTS: &[u8] = include_bytes!("fixtures/senate_101_1_00020_party_counts.xml");
const SENATE_PROCEDURAL: &[u8] = include_bytes!("fixtures/senate_119_1_00030_procedural.xml");
const SENATE_TREATY: &[u8] = include_bytes!("fixtures/senate_treaty.xml");
const SENATE_ROSTER: &[u8] = include_bytes!("fixtures/senate_roster.xml");

/// House 2023 roll 6 reconciles: totals, member sums and party sums agree.
#[test]
fn test_house_2023_roll_6_totals() {
    let parsed = HouseParser::new()
        .parse(HOUSE_2023_ROLL_6)
        .expect("fixture should parse");
    let vote = normalize(parsed).expect("fixture should validate");

    assert_eq!(vote.chamber, Chamber::House);
    assert_eq!((vote.congress, vote.session, vote.roll), (118, 1, 6));
    assert_eq!(vote.tally.get(Position::Yea), 220);
    assert_eq!(vote.tally.get(Position::Nay), 210);
    assert_eq!(vote.tally.get(Position::Present), 0);
    assert_eq!(vote.tally.get(Position::NotVoting), 3);
    assert_eq!(vote.positions.len(), 433);
    assert_eq!(vote.position_tally(), vote.tally);
    assert_eq!(vote.vote_type.as_deref(), Some("YEA-AND-NAY"));

    let parties = vote.party_tally.as_ref().expect("party totals present");
    assert_eq!(parties[&Party::Republican].get(Position::Yea), 218);
    assert_eq!(parties[&Party::Democrat].get(Position::Nay), 209);
    assert_eq!(
        vote.associated_item,
        Some(AssociatedItem::Bill(BillReference {
            congress: 118,
            bill_type: BillType::Hres,
            number: 5,
        }))
    );
}

/// Older House records with namespaced, mixed-case tags and Aye/No labels.
#[test]
fn test_house_legacy_layout() {
    let vote = normalize(HouseParser::new().parse(HOUSE_LEGACY).expect("should parse"))
        .expect("should validate");

    assert_eq!(vote.congress, 104);
    assert_eq!(vote.tally.get(Position::Yea), 12);
    assert_eq!(vote.tally.get(Position::Nay), 9);
    assert_eq!(vote.tally.get(Position::Present), 1);
    assert!(vote.party_tally.is_none(), "absent party totals stay absent");
    assert_eq!(vote.position_tally(), vote.tally);
}

/// Quorum calls have no associated item and record Present positions.
#[test]
fn test_house_quorum_call() {
    let vote = normalize(HouseParser::new().parse(HOUSE_QUORUM).expect("should parse"))
        .expect("should validate");

    assert!(vote.associated_item.is_none());
    assert_eq!(vote.question, "Call of the House");
    assert_eq!(vote.vote_type.as_deref(), Some("QUORUM"));
    assert_eq!(vote.tally.get(Position::Present), 410);
    assert_eq!(vote.tally.get(Position::NotVoting), 23);
}

/// A record without a roll number is reported as a missing "roll" field.
#[test]
fn test_house_missing_rollcall_num() {
    let err = HouseParser::new().parse(HOUSE_MISSING_ROLL).expect_err("should fail to parse");
    assert_eq!(err.chamber, Chamber::House);
    assert_eq!(err.kind, ParseErrorKind::MissingField("roll"));
}

/// Non-numeric totals are a malformed tally, not a zero.
#[test]
fn test_house_malformed_tally() {
    let err = HouseParser::new().parse(HOUSE_MALFORMED_TALLY).expect_err("should fail to parse");
    assert!(matches!(
        err.kind,
        ParseErrorKind::MalformedTally { ref value, .. } if value == "two"
    ));
}

/// Totals that disagree with member positions are rejected with each discrepancy.
#[test]
fn test_house_tally_mismatch_is_rejected() {
    let parsed = HouseParser::new()
        .parse(HOUSE_TALLY_MISMATCH)
        .expect("should parse");
    let err = normalize(parsed).expect_err("should not reconcile");

    let ValidationError::TallyMismatch { key, discrepancies } = err else {
        panic!("expected TallyMismatch");
    };
    assert_eq!(key.roll, 15);
    assert!(discrepancies
        .iter()
        .any(|d| d.source == TallySource::MemberPositions
            && d.position == Position::Yea
            && d.expected == 3
            && d.actual == 2));
    assert!(discrepancies
        .iter()
        .any(|d| d.source == TallySource::PartyTally && d.position == Position::Nay));
}

/// Senate nomination votes carry a Nomination item and member parties inline.
#[test]
fn test_senate_nomination() {
    let vote = normalize(
        SenateParser::new()
            .parse(SENATE_NOMINATION)
            .expect("should parse"),
    )
    .expect("should validate");

    assert_eq!(vote.chamber, Chamber::Senate);
    assert_eq!((vote.congress, vote.session, vote.roll), (119, 1, 11));
    assert_eq!(vote.result, "Nomination Confirmed");
    assert_eq!(vote.question, "On the Nomination PN11-9: Pete Hegseth, of Tennessee, to be Secretary of Defense");
    assert_eq!(vote.majority_requirement.as_deref(), Some("1/2"));
    assert!(vote.tie_breaker.is_none());
    assert_eq!(vote.positions.len(), 100);

    let Some(AssociatedItem::Nomination(nominee)) = &vote.associated_item else {
        panic!("expected a nomination");
    };
    assert_eq!(nominee.congress, 119);
    assert_eq!(nominee.number, "PN11-9");
    assert!(nominee
        .description
        .as_deref()
        .is_some_and(|d| d.contains("Secretary of Defense")));

    let parties = vote.party_tally.as_ref().expect("derived from member parties");
    assert_eq!(parties[&Party::Republican].get(Position::Yea), 51);
    assert_eq!(parties[&Party::Independent].get(Position::Nay), 2);
}

/// Amendment votes point at the amended measure and keep the tie breaker.
#[test]
fn test_senate_amendment() {
    let vote = normalize(SenateParser::new().parse(SENATE_AMENDMENT).expect("should parse"))
        .expect("should validate");

    assert_eq!(
        vote.associated_item,
        Some(AssociatedItem::Bill(BillReference {
            congress: 119,
            bill_type: BillType::S,
            number: 5,
        }))
    );
    let tie = vote.tie_breaker.as_ref().expect("tie breaker recorded");
    assert_eq!(tie.by_whom, "Vice President");
    assert_eq!(tie.vote, "Yea");
}

/// Aggregate party blocks are used when members carry no party.
#[test]
fn test_senate_party_counts_block() {
    let vote = normalize(
        SenateParser::new()
            .parse(SENATE_PARTY_COUNTS)
            .expect("should parse"),
    )
    .expect("should validate");

    assert!(vote.positions.iter().all(|p| p.party.is_none()));
    let parties = vote.party_tally.as_ref().expect("reported party counts");
    assert_eq!(parties[&Party::Republican].get(Position::Yea), 3);
    assert_eq!(parties[&Party::Democrat].get(Position::Present), 1);
}

/// Without a roster, members lacking a party leave the party tally absent.
#[test]
fn test_senate_without_roster_leaves_party_absent() {
    let vote = normalize(
        SenateParser::new()
            .parse(SENATE_PROCEDURAL)
            .expect("should parse"),
    )
    .expect("should validate");

    assert!(vote.associated_item.is_none());
    assert!(vote.party_tally.is_none());
    assert!(vote.positions.iter().all(|p| p.bioguide_id.is_none()));
}

/// The roster join supplies party and BioGuide id for every member.
#[test]
fn test_senate_roster_join() {
    let roster = SenateRoster::parse(SENATE_ROSTER).expect("roster should parse");
    let parser = SenateParser::with_roster(Arc::new(roster));
    let vote = normalize(parser.parse(SENATE_PROCEDURAL).expect("should parse"))
        .expect("should validate");

    assert!(vote
        .positions
        .iter()
        .all(|p| p.party.is_some() && p.bioguide_id.is_some()));
    let parties = vote.party_tally.as_ref().expect("derived after join");
    assert_eq!(parties[&Party::Republican].get(Position::Yea), 3);
    assert_eq!(parties[&Party::Democrat].get(Position::Nay), 2);

    let index = MemberPositionIndex::new(&vote);
    let first = &vote.positions[0];
    let bioguide = first.bioguide_id.as_deref().expect("joined");
    assert_eq!(index.lookup(bioguide), Some(first));
    assert_eq!(index.lookup(&first.member_id), Some(first));
}

/// Document types other than bills and nominations are refused.
#[test]
fn test_senate_treaty_is_unsupported() {
    let err = SenateParser::new().parse(SENATE_TREATY).expect_err("should fail to parse");
    assert_eq!(err.chamber, Chamber::Senate);
    assert_eq!(
        err.kind,
        ParseErrorKind::UnsupportedVoteSubtype("Treaty Doc.".to_string())
    );
}

/// Feeding a Senate document to the House parser fails cleanly.
#[test]
fn test_wrong_chamber_document() {
    let err = HouseParser::new().parse(SENATE_NOMINATION).expect_err("should fail to parse");
    assert_eq!(err.kind, ParseErrorKind::MissingField("vote-metadata"));
}

/// Truncated XML surfaces as an XML error.
#[test]
fn test_truncated_document() {
    let err = HouseParser::new()
        .parse(&HOUSE_2023_ROLL_6[..HOUSE_2023_ROLL_6.len() / 2])
        .expect_err("truncated XML should fail");
    assert!(matches!(err.kind, ParseErrorKind::Xml(_)));
}
