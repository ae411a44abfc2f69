//! Fetch → parse → validate, for single votes and member batches.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use futures::future::join_all;
use tc_rollcall::{
    check_identity, normalize, Chamber, ChamberParser, HouseParser, MemberPositionIndex,
    MemberVoteRecord, RollCallVote, SenateParser, SenateRoster,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::endpoints::FeedEndpoints;
use super::error::EngineError;
use super::request::{validate_member_id, validate_roll, ResolvedScope, RollCallId, RollCallScope};
use crate::config::Config;
use crate::fetch::{ConcurrencyGate, DocumentSource, Fetcher};

/// What one requested roll yielded for the member.
#[derive(Debug, Clone)]
pub enum PositionOutcome {
    Found(MemberVoteRecord),
    /// The roll call exists but the member has no position on it.
    NotFound,
    Failed(EngineError),
}

/// One entry per requested roll, in request order.
#[derive(Debug, Clone)]
pub struct MemberRollOutcome {
    pub roll: u32,
    pub outcome: PositionOutcome,
}

/// Public entry point over the chamber feeds.
///
/// The gate and document source are built once and shared; every call races
/// the caller's [`CancellationToken`] and the configured call deadline.
pub struct VoteEngine {
    source: Arc<dyn DocumentSource>,
    gate: ConcurrencyGate,
    endpoints: FeedEndpoints,
    senate_roster: bool,
    call_deadline: Duration,
    current_year: i32,
}

impl VoteEngine {
    #[must_use]
    pub fn new(
        source: Arc<dyn DocumentSource>,
        gate: ConcurrencyGate,
        endpoints: FeedEndpoints,
    ) -> Self {
        Self {
            source,
            gate,
            endpoints,
            senate_roster: true,
            call_deadline: Duration::from_secs(120),
            current_year: chrono::Utc::now().year(),
        }
    }

    /// Engine over real HTTP, wired from config.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error when the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let fetcher = Fetcher::from_config(&config.feeds)?;
        Ok(Self::new(
            Arc::new(fetcher),
            ConcurrencyGate::new(config.feeds.max_concurrency),
            FeedEndpoints::from_config(&config.feeds),
        )
        .with_senate_roster(config.feeds.senate_roster_enabled)
        .with_call_deadline(config.engine.call_deadline()))
    }

    /// Fetch the Senate roster to resolve member party and BioGuide ids.
    #[must_use]
    pub const fn with_senate_roster(mut self, enabled: bool) -> Self {
        self.senate_roster = enabled;
        self
    }

    #[must_use]
    pub const fn with_call_deadline(mut self, deadline: Duration) -> Self {
        self.call_deadline = deadline;
        self
    }

    /// Override the year used to bound "future" congresses.
    #[must_use]
    pub const fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    #[must_use]
    pub const fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    /// Fetch, parse and validate one roll call.
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` before any I/O; otherwise `Fetch`, `NotFound`,
    /// `Parse`, `Validation`, `Cancelled` or `DeadlineExceeded`.
    pub async fn get_vote_details(
        &self,
        id: RollCallId,
        cancel: &CancellationToken,
    ) -> Result<RollCallVote, EngineError> {
        let scope = id.resolve(self.current_year)?;
        let deadline = Instant::now() + self.call_deadline;
        tracing::info!(
            chamber = %scope.chamber,
            congress = scope.congress,
            session = scope.session,
            roll = id.roll,
            "fetching roll call"
        );

        let result = race(
            async {
                let parser = self.parser_for(&scope).await;
                self.fetch_vote(&scope, id.roll, parser.as_ref()).await
            },
            cancel,
            deadline,
        )
        .await;

        match &result {
            Ok(vote) => tracing::info!(
                key = %vote.key(),
                positions = vote.positions.len(),
                "roll call ready"
            ),
            Err(err) => tracing::warn!(roll = id.roll, error = %err, "roll call failed"),
        }
        result
    }

    /// One member's position across several rolls of one session.
    ///
    /// Rolls are fetched concurrently under the shared gate. The result has
    /// exactly one outcome per requested roll, in request order; a failing
    /// roll does not affect the others.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier`, before any I/O, for a bad scope, member id
    /// or roll number, or an empty roll list.
    pub async fn get_member_positions(
        &self,
        scope: RollCallScope,
        member_id: &str,
        rolls: &[u32],
        cancel: &CancellationToken,
    ) -> Result<Vec<MemberRollOutcome>, EngineError> {
        let scope = scope.resolve(self.current_year)?;
        let member_id = validate_member_id(member_id)?;
        if rolls.is_empty() {
            return Err(EngineError::invalid("at least one roll number is required"));
        }
        for &roll in rolls {
            validate_roll(roll)?;
        }

        let deadline = Instant::now() + self.call_deadline;
        tracing::info!(
            chamber = %scope.chamber,
            congress = scope.congress,
            session = scope.session,
            member_id,
            rolls = rolls.len(),
            "fetching member positions"
        );

        let parser = match race(async { Ok(self.parser_for(&scope).await) }, cancel, deadline).await
        {
            Ok(parser) => parser,
            Err(err) => {
                return Ok(rolls
                    .iter()
                    .map(|&roll| MemberRollOutcome {
                        roll,
                        outcome: PositionOutcome::Failed(err.clone()),
                    })
                    .collect());
            }
        };

        let pending = rolls.iter().map(|&roll| {
            let parser = Arc::clone(&parser);
            async move {
                let fetched = race(
                    self.fetch_vote(&scope, roll, parser.as_ref()),
                    cancel,
                    deadline,
                )
                .await;
                let outcome = match fetched {
                    Ok(vote) => match MemberPositionIndex::new(&vote).lookup(member_id) {
                        Some(position) => {
                            PositionOutcome::Found(MemberVoteRecord::new(&vote, position.clone()))
                        }
                        None => PositionOutcome::NotFound,
                    },
                    Err(err) => {
                        tracing::warn!(roll, error = %err, "roll failed in member batch");
                        PositionOutcome::Failed(err)
                    }
                };
                MemberRollOutcome { roll, outcome }
            }
        });
        let outcomes = join_all(pending).await;

        let found = outcomes
            .iter()
            .filter(|o| matches!(o.outcome, PositionOutcome::Found(_)))
            .count();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o.outcome, PositionOutcome::Failed(_)))
            .count();
        tracing::info!(
            member_id,
            found,
            not_found = outcomes.len() - found - failed,
            failed,
            "member positions complete"
        );
        Ok(outcomes)
    }

    /// House parser, or a Senate parser joined against the roster when one
    /// can be had. A roster failure only costs party and BioGuide resolution.
    async fn parser_for(&self, scope: &ResolvedScope) -> Arc<dyn ChamberParser> {
        match scope.chamber {
            Chamber::House => Arc::new(HouseParser::new()),
            Chamber::Senate if self.senate_roster => match self.load_roster().await {
                Ok(roster) => {
                    tracing::debug!(senators = roster.len(), "Senate roster loaded");
                    Arc::new(SenateParser::with_roster(Arc::new(roster)))
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Senate roster unavailable; member party may be absent");
                    Arc::new(SenateParser::new())
                }
            },
            Chamber::Senate => Arc::new(SenateParser::new()),
        }
    }

    async fn load_roster(&self) -> Result<SenateRoster, EngineError> {
        let bytes = {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| EngineError::Cancelled)?;
            self.source.get(&self.endpoints.senate_roster_url).await?
        };
        SenateRoster::parse(&bytes).map_err(|source| EngineError::Parse { roll: 0, source })
    }

    async fn fetch_vote(
        &self,
        scope: &ResolvedScope,
        roll: u32,
        parser: &dyn ChamberParser,
    ) -> Result<RollCallVote, EngineError> {
        let url = self.endpoints.vote_url(scope, roll);
        let fetched = {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| EngineError::Cancelled)?;
            tracing::debug!(url = %url, roll, in_flight = self.gate.in_flight(), "fetching");
            self.source.get(&url).await
        };

        let bytes = match fetched {
            Ok(bytes) => bytes,
            Err(err) if err.is_not_found() => {
                return Err(EngineError::NotFound {
                    roll,
                    what: format!("{} roll call", scope.chamber),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let parsed = parser
            .parse(&bytes)
            .map_err(|source| EngineError::Parse { roll, source })?;
        let vote = normalize(parsed).map_err(|source| EngineError::Validation { roll, source })?;
        check_identity(scope.key(roll), &vote)
            .map_err(|source| EngineError::Validation { roll, source })?;
        Ok(vote)
    }
}

/// Run `work` unless the caller cancels or the deadline passes first.
/// Losing the race drops `work`, releasing any gate permit it holds.
async fn race<T>(
    work: impl Future<Output = Result<T, EngineError>>,
    cancel: &CancellationToken,
    deadline: Instant,
) -> Result<T, EngineError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(EngineError::Cancelled),
        () = tokio::time::sleep_until(deadline) => Err(EngineError::DeadlineExceeded),
        result = work => result,
    }
}
