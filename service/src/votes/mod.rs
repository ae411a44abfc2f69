//! Roll-call votes from the House Clerk and Senate feeds.
//!
//! [`VoteEngine`] drives a [`DocumentSource`](crate::fetch::DocumentSource)
//! through the `tc_rollcall` parsers:
//!
//! ```ignore
//! use tinycongress_votes::votes::{RollCallScope, VoteEngine};
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = VoteEngine::from_config(&config)?;
//! let cancel = CancellationToken::new();
//! let vote = engine
//!     .get_vote_details(RollCallScope::house(118, 2023).roll(6), &cancel)
//!     .await?;
//! println!("{}: {}", vote.question, vote.result);
//! ```

mod endpoints;
mod engine;
mod error;
mod request;

pub use endpoints::FeedEndpoints;
pub use engine::{MemberRollOutcome, PositionOutcome, VoteEngine};
pub use error::EngineError;
pub use request::{
    ResolvedScope, RollCallId, RollCallScope, SessionOrYear, HOUSE_FIRST_YEAR, MAX_ROLL,
    SENATE_FIRST_CONGRESS,
};
