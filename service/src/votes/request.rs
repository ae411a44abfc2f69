//! Caller-facing roll-call identifiers and their validation.
//!
//! Everything here is checked before any I/O so a bad request never reaches
//! the network.

use serde::{Deserialize, Serialize};
use tc_rollcall::{calendar, Chamber, VoteKey};

use super::error::EngineError;

/// First year the House Clerk publishes EVS roll-call XML.
pub const HOUSE_FIRST_YEAR: i32 = 1990;
/// First congress the Senate LIS publishes roll-call XML for.
pub const SENATE_FIRST_CONGRESS: u16 = 101;
pub const MAX_ROLL: u32 = 9_999;
const MAX_MEMBER_ID_LEN: usize = 16;

/// How the caller locates the session: House feeds are organised by calendar
/// year, Senate feeds by session of congress. Either chamber accepts either form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrYear {
    Session(u8),
    Year(i32),
}

/// One chamber's roll calls for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollCallScope {
    pub chamber: Chamber,
    pub congress: u16,
    pub period: SessionOrYear,
}

/// A single roll call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollCallId {
    pub scope: RollCallScope,
    pub roll: u32,
}

/// A scope after validation, with both session and year known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedScope {
    pub chamber: Chamber,
    pub congress: u16,
    pub session: u8,
    pub year: i32,
}

impl ResolvedScope {
    #[must_use]
    pub const fn key(&self, roll: u32) -> VoteKey {
        VoteKey {
            chamber: self.chamber,
            congress: self.congress,
            session: self.session,
            roll,
        }
    }
}

impl RollCallScope {
    #[must_use]
    pub const fn house(congress: u16, year: i32) -> Self {
        Self {
            chamber: Chamber::House,
            congress,
            period: SessionOrYear::Year(year),
        }
    }

    #[must_use]
    pub const fn senate(congress: u16, session: u8) -> Self {
        Self {
            chamber: Chamber::Senate,
            congress,
            period: SessionOrYear::Session(session),
        }
    }

    #[must_use]
    pub const fn roll(self, roll: u32) -> RollCallId {
        RollCallId { scope: self, roll }
    }

    /// Validate against the calendar, with `current_year` bounding how far
    /// ahead a congress may be.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidIdentifier`] for a congress outside the
    /// published range, a year outside the congress, or a session other than 1 or 2.
    pub fn resolve(&self, current_year: i32) -> Result<ResolvedScope, EngineError> {
        let congress = self.congress;
        if congress == 0 {
            return Err(EngineError::invalid("congress must be at least 1"));
        }
        let latest = current_year
            .checked_add(1)
            .and_then(calendar::congress_for_year)
            .unwrap_or(u16::MAX);
        if congress > latest {
            return Err(EngineError::invalid(format!(
                "congress {congress} has not convened (latest is {latest})"
            )));
        }

        let (session, year) = match self.period {
            SessionOrYear::Year(year) => {
                let session = calendar::session_for_year(congress, year).ok_or_else(|| {
                    EngineError::invalid(format!(
                        "year {year} is outside congress {congress} ({}-{})",
                        calendar::first_year(congress),
                        calendar::first_year(congress) + 1
                    ))
                })?;
                (session, year)
            }
            SessionOrYear::Session(session) => {
                let year = calendar::year_for_session(congress, session).ok_or_else(|| {
                    EngineError::invalid(format!("session must be 1 or 2, got {session}"))
                })?;
                (session, year)
            }
        };

        match self.chamber {
            Chamber::House if year < HOUSE_FIRST_YEAR => Err(EngineError::invalid(format!(
                "House roll-call XML starts in {HOUSE_FIRST_YEAR}, got {year}"
            ))),
            Chamber::Senate if congress < SENATE_FIRST_CONGRESS => {
                Err(EngineError::invalid(format!(
                    "Senate roll-call XML starts with congress {SENATE_FIRST_CONGRESS}, got {congress}"
                )))
            }
            chamber => Ok(ResolvedScope {
                chamber,
                congress,
                session,
                year,
            }),
        }
    }
}

impl RollCallId {
    /// # Errors
    ///
    /// As [`RollCallScope::resolve`], plus a roll number outside 1..=9999.
    pub fn resolve(&self, current_year: i32) -> Result<ResolvedScope, EngineError> {
        validate_roll(self.roll)?;
        self.scope.resolve(current_year)
    }
}

pub(crate) fn validate_roll(roll: u32) -> Result<(), EngineError> {
    if (1..=MAX_ROLL).contains(&roll) {
        Ok(())
    } else {
        Err(EngineError::invalid(format!(
            "roll number must be in 1..={MAX_ROLL}, got {roll}"
        )))
    }
}

/// Member ids are House `name-id`s, Senate LIS ids or BioGuide ids: short and alphanumeric.
pub(crate) fn validate_member_id(member_id: &str) -> Result<&str, EngineError> {
    let id = member_id.trim();
    if id.is_empty() || id.len() > MAX_MEMBER_ID_LEN || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EngineError::invalid(format!(
            "member id must be 1-{MAX_MEMBER_ID_LEN} ASCII letters or digits, got '{member_id}'"
        )));
    }
    Ok(id)
}
