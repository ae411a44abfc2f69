//! Member id → position lookup over one validated vote.

use std::collections::HashMap;

use crate::model::{MemberVotePosition, RollCallVote};

/// Borrowing index over a vote's member positions.
///
/// Both the feed id and the BioGuide id (when known) resolve, case-insensitively.
#[derive(Debug)]
pub struct MemberPositionIndex<'a> {
    positions: &'a [MemberVotePosition],
    by_id: HashMap<String, usize>,
}

impl<'a> MemberPositionIndex<'a> {
    #[must_use]
    pub fn new(vote: &'a RollCallVote) -> Self {
        Self::from_positions(&vote.positions)
    }

    #[must_use]
    pub fn from_positions(positions: &'a [MemberVotePosition]) -> Self {
        let mut by_id = HashMap::with_capacity(positions.len() * 2);
        for (i, position) in positions.iter().enumerate() {
            by_id
                .entry(position.member_id.to_ascii_uppercase())
                .or_insert(i);
            if let Some(bioguide) = &position.bioguide_id {
                by_id.entry(bioguide.to_ascii_uppercase()).or_insert(i);
            }
        }
        Self { positions, by_id }
    }

    #[must_use]
    pub fn lookup(&self, member_id: &str) -> Option<&'a MemberVotePosition> {
        let positions = self.positions;
        self.by_id
            .get(&member_id.trim().to_ascii_uppercase())
            .and_then(|&i| positions.get(i))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
