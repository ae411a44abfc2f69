//! Reconciliation of parsed records into validated [`RollCallVote`]s.
//!
//! The feed is authoritative. A record whose member positions or party
//! totals disagree with its overall tally is rejected with every discrepancy
//! listed, never patched up.

use std::collections::{BTreeMap, HashSet};

use crate::error::{Discrepancy, TallySource, ValidationError};
use crate::model::{
    MemberVotePosition, Party, PartyTally, Position, RollCallVote, Tally, VoteKey,
};
use crate::parser::{ParsedVote, PartyBreakdown};

/// Turn a chamber parser's output into a validated record.
///
/// # Errors
///
/// Returns [`ValidationError`] when a member appears twice or when member
/// positions or party totals do not sum to the overall tally.
pub fn normalize(parsed: ParsedVote) -> Result<RollCallVote, ValidationError> {
    let party_tally = match parsed.party_breakdown {
        PartyBreakdown::Reported(parties) => Some(parties),
        PartyBreakdown::FromMembers => derive_party_tally(&parsed.positions),
        PartyBreakdown::Absent => None,
    };

    let vote = RollCallVote {
        chamber: parsed.chamber,
        congress: parsed.congress,
        session: parsed.session,
        roll: parsed.roll,
        date: parsed.date,
        question: parsed.question,
        result: parsed.result,
        vote_type: parsed.vote_type,
        majority_requirement: parsed.majority_requirement,
        tally: parsed.tally,
        party_tally,
        positions: parsed.positions,
        associated_item: parsed.associated_item,
        tie_breaker: parsed.tie_breaker,
    };
    validate(&vote)?;

    tracing::debug!(
        key = %vote.key(),
        positions = vote.positions.len(),
        party_tally = vote.party_tally.is_some(),
        "roll call validated"
    );
    Ok(vote)
}

/// Check a record's internal consistency.
///
/// # Errors
///
/// Returns [`ValidationError::DuplicateMember`] for a repeated member id and
/// [`ValidationError::TallyMismatch`] listing each outcome label whose member
/// or party sum differs from the overall tally.
pub fn validate(vote: &RollCallVote) -> Result<(), ValidationError> {
    let key = vote.key();

    let mut seen = HashSet::new();
    for position in &vote.positions {
        let id = position.member_id.to_ascii_uppercase();
        if !id.is_empty() && !seen.insert(id) {
            return Err(ValidationError::DuplicateMember {
                key,
                member_id: position.member_id.clone(),
            });
        }
    }

    let mut discrepancies = Vec::new();
    if !vote.positions.is_empty() {
        let members = vote.position_tally();
        compare(
            &vote.tally,
            |position| u64::from(members.get(position)),
            TallySource::MemberPositions,
            &mut discrepancies,
        );
    }
    if let Some(parties) = &vote.party_tally {
        let summed = |position: Position| {
            parties
                .values()
                .map(|tally| u64::from(tally.get(position)))
                .sum::<u64>()
        };
        compare(&vote.tally, summed, TallySource::PartyTally, &mut discrepancies);
    }

    if discrepancies.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::TallyMismatch { key, discrepancies })
    }
}

/// Ensure a record is the one that was asked for.
///
/// # Errors
///
/// Returns [`ValidationError::IdentityMismatch`] when the keys differ.
pub fn check_identity(expected: VoteKey, vote: &RollCallVote) -> Result<(), ValidationError> {
    let actual = vote.key();
    if actual == expected {
        Ok(())
    } else {
        Err(ValidationError::IdentityMismatch { expected, actual })
    }
}

fn compare(
    expected: &Tally,
    actual: impl Fn(Position) -> u64,
    source: TallySource,
    out: &mut Vec<Discrepancy>,
) {
    for position in Position::ALL {
        let (want, got) = (expected.get(position), actual(position));
        if u64::from(want) != got {
            out.push(Discrepancy {
                source,
                position,
                expected: want,
                actual: got,
            });
        }
    }
}

/// Party tally from member parties, only when every member has one.
fn derive_party_tally(positions: &[MemberVotePosition]) -> Option<PartyTally> {
    if positions.is_empty() {
        return None;
    }
    let mut parties: BTreeMap<Party, Tally> = BTreeMap::new();
    for member in positions {
        let party = member.party.clone()?;
        parties.entry(party).or_default().add(member.position, 1);
    }
    Some(parties)
}
