use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use crate::contract::{DealStage, Party, ReviewAction};

pub mod commands;

#[derive(Parser)]
#[command(name = "dugout")]
#[command(about = "Transfer negotiation orchestration for club staff")]
#[command(long_about = "Dugout drives player transfer negotiations from drafted offer to completed \
                       deal, with every stage change checked against one legality table. Get started \
                       with 'dugout status' to see your team's negotiation board.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display the team's negotiation board grouped by stage
    Status {
        /// Team to report on
        #[arg(long, help = "Team id (defaults to workflow.team_id from dugout.toml)")]
        team: Option<Uuid>,
    },
    /// Show one contract in full, including its legal next moves
    Show {
        /// Contract id
        contract: Uuid,
    },
    /// Draft a new contract against an open pitch
    Create {
        /// Pitch the offer is for
        #[arg(long, help = "Id of the pitch this offer answers")]
        pitch: Uuid,
        /// Team making the offer
        #[arg(long, help = "Offering team id (defaults to workflow.team_id)")]
        team: Option<Uuid>,
        /// Counterparty agent, if already known
        #[arg(long, help = "Agent id to assign up front (can be assigned later)")]
        agent: Option<Uuid>,
        /// Offer value in minor units
        #[arg(long, help = "Offer value in minor units, e.g. 150000000 for 1.5M")]
        value: i64,
        /// ISO 4217 currency code
        #[arg(long, default_value = "EUR", help = "ISO 4217 currency code")]
        currency: String,
        /// Free-text terms
        #[arg(long, conflicts_with = "terms_file", help = "Plain-text contract terms")]
        terms: Option<String>,
        /// Structured terms from a JSON file
        #[arg(long, help = "Path to a JSON object of structured terms")]
        terms_file: Option<PathBuf>,
        /// Days until the offer lapses
        #[arg(long, help = "Days until expiry (defaults to workflow.default_expiry_days)")]
        expires_in_days: Option<u32>,
    },
    /// Assign the counterparty agent to a draft contract
    Assign {
        /// Contract id
        contract: Uuid,
        /// Agent id
        #[arg(long, help = "Agent who will negotiate for the player")]
        agent: Uuid,
    },
    /// Send a draft contract to its agent to open negotiation
    Send {
        /// Contract id
        contract: Uuid,
    },
    /// Advance a contract to a stage, checked against the legality table
    Advance {
        /// Contract id
        contract: Uuid,
        /// Target stage: negotiating, under_review, signed, completed, rejected, expired
        stage: DealStage,
    },
    /// Record a signature on a contract (agent first, then team)
    Sign {
        /// Contract id
        contract: Uuid,
        /// Which party is signing: agent or team
        party: Party,
        /// Signature image to upload
        #[arg(long, help = "Path to a signature image; only its stored URL is kept")]
        image: Option<PathBuf>,
    },
    /// Record the assigned agent's verdict on a contract under review
    Review {
        /// Contract id
        contract: Uuid,
        /// Verdict: accept, modify, or reject
        action: ReviewAction,
        /// Reviewing agent
        #[arg(long, help = "Id of the agent recording the verdict")]
        reviewer: Uuid,
        /// Free-text note back to the team
        #[arg(long, help = "Optional note stored with the verdict")]
        note: Option<String>,
    },
    /// Expire lapsed contracts whose expiry date has passed
    Sweep {
        /// Expire one specific contract instead of sweeping everything
        #[arg(long, help = "Expire just this contract now")]
        contract: Option<Uuid>,
    },
    /// Show a team's activity timeline grouped by season
    Timeline {
        /// Team whose timeline to show
        #[arg(long, help = "Team id (defaults to workflow.team_id from dugout.toml)")]
        team: Option<Uuid>,
    },
    /// Write a starter dugout.toml and check store connectivity
    Init {
        /// Record store base URL
        #[arg(long, help = "Base URL of the hosted record store")]
        base_url: Option<String>,
        /// Workspace id
        #[arg(long, help = "Workspace (tenant) all requests are scoped to")]
        workspace: Option<String>,
        /// Overwrite an existing dugout.toml
        #[arg(long, help = "Overwrite existing configuration")]
        force: bool,
        /// Show what would be written without writing
        #[arg(long, help = "Print the configuration without writing it")]
        dry_run: bool,
    },
}
