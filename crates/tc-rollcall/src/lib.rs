//! Roll-call vote records for `TinyCongress`
//!
//! This crate turns the House Clerk (EVS) and Senate (LIS) roll-call XML
//! feeds into one validated [`RollCallVote`] shape. It performs no I/O:
//! callers fetch the bytes and hand them to a [`ChamberParser`], then pass
//! the result through [`normalize`].

#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

pub mod calendar;
mod error;
mod house;
mod index;
mod model;
pub mod normalize;
mod parser;
mod senate;
mod xml;

pub use error::{Discrepancy, ParseError, ParseErrorKind, TallySource, ValidationError};
pub use house::HouseParser;
pub use index::MemberPositionIndex;
pub use model::{
    AssociatedItem, BillReference, BillType, Chamber, MemberVotePosition, MemberVoteRecord,
    NomineeReference, Party, PartyTally, Position, RollCallVote, Tally, TieBreaker, UnknownChamber,
    VoteKey,
};
pub use normalize::{check_identity, normalize, validate};
pub use parser::{ChamberParser, ParsedVote, PartyBreakdown};
pub use senate::{RosterEntry, SenateParser, SenateRoster};
