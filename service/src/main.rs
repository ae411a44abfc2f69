//! `tc-votes`: fetch roll calls, member positions and bill data, printed as JSON.
//!
//! ```text
//! tc-votes vote --chamber house --congress 118 --year 2023 --roll 6
//! tc-votes member --chamber senate --congress 119 --session 1 --member S354 --rolls 11,12,13
//! tc-votes bill --congress 118 --type hr --number 815 --cosponsors
//! tc-votes members --name Booker --chamber senate
//! ```

#![allow(clippy::print_stdout)]

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tc_rollcall::{BillType, Chamber};
use tinycongress_votes::{
    config::Config,
    congress::{bill_overview, CongressApiClient, HttpCongressClient, MemberFilters},
    fetch::RetryPolicy,
    telemetry,
    votes::{PositionOutcome, RollCallScope, SessionOrYear, VoteEngine},
};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(
    name = "tc-votes",
    author,
    version,
    about = "Fetch and validate congressional roll-call votes"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one validated roll call
    Vote {
        #[command(flatten)]
        scope: ScopeArgs,
        #[arg(long)]
        roll: u32,
    },
    /// Print one member's position on each listed roll
    Member {
        #[command(flatten)]
        scope: ScopeArgs,
        /// House name-id, Senate LIS id or BioGuide id
        #[arg(long)]
        member: String,
        #[arg(long, value_delimiter = ',', required = true)]
        rolls: Vec<u32>,
    },
    /// Bill metadata from Congress.gov
    Bill {
        #[arg(long)]
        congress: u16,
        /// hr, s, hres, sjres, ...
        #[arg(long = "type", value_parser = parse_bill_type)]
        bill_type: BillType,
        #[arg(long)]
        number: u32,
        /// Also list every cosponsor
        #[arg(long)]
        cosponsors: bool,
    },
    /// Search members by name on Congress.gov
    Members {
        #[arg(long)]
        name: String,
        #[arg(long)]
        congress: Option<u16>,
        #[arg(long)]
        chamber: Option<Chamber>,
        /// Two-letter state code
        #[arg(long)]
        state: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ScopeArgs {
    #[arg(long)]
    chamber: Chamber,
    #[arg(long)]
    congress: u16,
    /// Session of the congress (1 or 2)
    #[arg(long, conflicts_with = "year", required_unless_present = "year")]
    session: Option<u8>,
    /// Calendar year within the congress
    #[arg(long)]
    year: Option<i32>,
}

impl ScopeArgs {
    fn scope(&self) -> RollCallScope {
        let period = match (self.session, self.year) {
            (Some(session), _) => SessionOrYear::Session(session),
            (None, Some(year)) => SessionOrYear::Year(year),
            // clap requires one of the two
            (None, None) => SessionOrYear::Session(0),
        };
        RollCallScope {
            chamber: self.chamber,
            congress: self.congress,
            period,
        }
    }
}

fn parse_bill_type(raw: &str) -> Result<BillType, String> {
    BillType::from_designation(raw).ok_or_else(|| format!("unknown bill type '{raw}'"))
}

fn outcome_json(roll: u32, outcome: &PositionOutcome) -> Result<Value, serde_json::Error> {
    Ok(match outcome {
        PositionOutcome::Found(record) => json!({
            "roll": roll,
            "status": "found",
            "record": serde_json::to_value(record)?,
        }),
        PositionOutcome::NotFound => json!({ "roll": roll, "status": "not_found" }),
        PositionOutcome::Failed(err) => json!({
            "roll": roll,
            "status": "failed",
            "error": err.to_string(),
        }),
    })
}

fn congress_client(config: &Config) -> anyhow::Result<HttpCongressClient> {
    HttpCongressClient::from_config(
        &config.congress_api,
        RetryPolicy::from_config(&config.feeds),
        &config.feeds.user_agent,
    )
    .context("Congress.gov client")
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let config = Config::load().map_err(|e| anyhow::anyhow!("{e}"))?;
    telemetry::init(&config.logging);
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "tc-votes starting");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted; cancelling in-flight requests");
            on_interrupt.cancel();
        }
    });

    let output = match cli.command {
        Command::Vote { scope, roll } => {
            let engine = VoteEngine::from_config(&config)?;
            let vote = engine
                .get_vote_details(scope.scope().roll(roll), &cancel)
                .await?;
            serde_json::to_value(&vote)?
        }
        Command::Member {
            scope,
            member,
            rolls,
        } => {
            let engine = VoteEngine::from_config(&config)?;
            let outcomes = engine
                .get_member_positions(scope.scope(), &member, &rolls, &cancel)
                .await?;
            let items = outcomes
                .iter()
                .map(|o| outcome_json(o.roll, &o.outcome))
                .collect::<Result<Vec<_>, _>>()?;
            Value::Array(items)
        }
        Command::Bill {
            congress,
            bill_type,
            number,
            cosponsors,
        } => {
            let client = congress_client(&config)?;
            let overview = bill_overview(&client, congress, bill_type, number, cosponsors).await?;
            serde_json::to_value(&overview)?
        }
        Command::Members {
            name,
            congress,
            chamber,
            state,
        } => {
            let client = congress_client(&config)?;
            let filters = MemberFilters {
                congress,
                chamber,
                state,
            };
            serde_json::to_value(client.search_members(&name, &filters).await?)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
