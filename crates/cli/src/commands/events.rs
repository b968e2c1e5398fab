//! Event commands for restaurant accounts.
//!
//! Removal works by position in the listed output: `event list` prints
//! numbered entries, `event remove --index N` loads the profile and
//! removes that exact entry by value.

use clap::Subcommand;

use hidden_fork_client::{AppError, AppState, ProfileService};
use hidden_fork_core::{AccountKind, Event};

use super::Credentials;

#[derive(Subcommand)]
pub enum EventAction {
    /// Announce a new event
    Add {
        #[command(flatten)]
        credentials: Credentials,

        /// Event name
        #[arg(long)]
        name: String,

        /// Event description
        #[arg(long)]
        description: String,

        /// Event date, free-form text shown as-is
        #[arg(long)]
        date: String,

        /// Optional discount text
        #[arg(long)]
        discount: Option<String>,
    },
    /// Remove an event by its position in `event list`
    Remove {
        #[command(flatten)]
        credentials: Credentials,

        /// Zero-based index from `event list`
        #[arg(long)]
        index: usize,
    },
    /// List announced events
    List {
        #[command(flatten)]
        credentials: Credentials,
    },
}

pub async fn run(state: &AppState, action: EventAction) -> Result<(), AppError> {
    let service = ProfileService::new(state.clone());
    match action {
        EventAction::Add {
            credentials,
            name,
            description,
            date,
            discount,
        } => {
            let (session, _) =
                super::authenticate_as(state, &credentials, Some(AccountKind::Restaurant)).await?;
            let event = Event::new(name, description, date, discount);
            service.add_event(&session.account_id, event).await?;
            tracing::info!("event announced");
            Ok(())
        }
        EventAction::Remove { credentials, index } => {
            let (session, _) =
                super::authenticate_as(state, &credentials, Some(AccountKind::Restaurant)).await?;
            let profile = service.load_restaurant(&session.account_id).await?;
            let Some(event) = profile.events.get(index) else {
                tracing::error!(
                    "no event at index {index}; `hf event list` shows {} entries",
                    profile.events.len()
                );
                std::process::exit(1);
            };
            service.remove_event(&session.account_id, event).await?;
            tracing::info!("event removed: {}", event.event_name);
            Ok(())
        }
        EventAction::List { credentials } => {
            let (session, _) =
                super::authenticate_as(state, &credentials, Some(AccountKind::Restaurant)).await?;
            let profile = service.load_restaurant(&session.account_id).await?;
            if profile.events.is_empty() {
                tracing::info!("no events announced");
                return Ok(());
            }
            for (index, event) in profile.events.iter().enumerate() {
                match &event.discount {
                    Some(discount) => tracing::info!(
                        "[{index}] {} - {} ({}) discount: {discount}",
                        event.event_name,
                        event.description,
                        event.date
                    ),
                    None => tracing::info!(
                        "[{index}] {} - {} ({})",
                        event.event_name,
                        event.description,
                        event.date
                    ),
                }
            }
            Ok(())
        }
    }
}
