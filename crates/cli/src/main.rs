//! Hidden Fork CLI - command-line client for the hosted backend.
//!
//! # Usage
//!
//! ```bash
//! # Create an account and pick its type
//! hf signup -e owner@fork.example -p hunter22
//! hf onboard -e owner@fork.example -p hunter22 --kind restaurant
//!
//! # Edit and inspect the profile
//! hf profile edit -e owner@fork.example -p hunter22 --business-name "Forkful"
//! hf profile show -e owner@fork.example -p hunter22
//!
//! # Weekly hours, tags, events, profile image
//! hf hours set -e owner@fork.example -p hunter22 --day mon --open "9 AM - 5 PM"
//! hf tags set -e owner@fork.example -p hunter22 vegan coffee
//! hf event add -e owner@fork.example -p hunter22 --name "Taco Night" \
//!     --description "Half-price tacos" --date 2026-09-01
//! hf image set -e owner@fork.example -p hunter22 --file photo.jpg
//!
//! # Discover restaurants (no account needed)
//! hf search
//! ```
//!
//! # Environment Variables
//!
//! - `HF_API_BASE_URL`, `HF_STORAGE_BASE_URL`, `HF_GEOCODER_BASE_URL`
//! - `HF_PROJECT_ID`, `HF_API_KEY`
//! - `HF_GEOCODE_CONCURRENCY`, `HF_GEOCODE_CACHE_TTL_SECS` (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hidden_fork_client::config::HiddenForkConfig;
use hidden_fork_client::{AppError, AppState};
use hidden_fork_core::AccountKind;

mod commands;

use commands::Credentials;

#[derive(Parser)]
#[command(name = "hf")]
#[command(author, version, about = "Hidden Fork command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new account
    Signup {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Sign in and report the account's type
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Choose whether this account is a customer or a restaurant
    Onboard {
        #[command(flatten)]
        credentials: Credentials,

        /// Account type: customer or restaurant
        #[arg(long)]
        kind: AccountKind,
    },
    /// Show or edit the signed-in account's profile
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Manage weekly opening hours (restaurant accounts)
    Hours {
        #[command(subcommand)]
        action: commands::profile::HoursAction,
    },
    /// Manage tags (restaurant accounts)
    Tags {
        #[command(subcommand)]
        action: commands::profile::TagsAction,
    },
    /// Manage announced events (restaurant accounts)
    Event {
        #[command(subcommand)]
        action: commands::events::EventAction,
    },
    /// Manage the profile image
    Image {
        #[command(subcommand)]
        action: commands::media::ImageAction,
    },
    /// List every restaurant with resolved map coordinates
    Search,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        // Full cause for the log, stable message for the user.
        tracing::error!("command failed: {err}");
        tracing::error!("{}", err.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = match HiddenForkConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("configuration error: {err}");
            std::process::exit(2);
        }
    };
    let state = AppState::from_config(&config);

    match cli.command {
        Commands::Signup { credentials } => commands::account::signup(&state, &credentials).await,
        Commands::Login { credentials } => commands::account::login(&state, &credentials).await,
        Commands::Onboard { credentials, kind } => {
            commands::account::onboard(&state, &credentials, kind).await
        }
        Commands::Profile { action } => commands::profile::run(&state, action).await,
        Commands::Hours { action } => commands::profile::run_hours(&state, action).await,
        Commands::Tags { action } => commands::profile::run_tags(&state, action).await,
        Commands::Event { action } => commands::events::run(&state, action).await,
        Commands::Image { action } => commands::media::run(&state, action).await,
        Commands::Search => commands::search::run(&state).await,
    }
}
