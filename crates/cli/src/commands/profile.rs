//! Profile commands: show, edit, hours, tags.
//!
//! Edits load nothing: they build a merge patch from the supplied flags
//! and send only that. Hours and tags are the exception - the backend
//! stores each as one value, so those commands read the current value,
//! apply the change locally, and write the whole field back.

use clap::Subcommand;

use hidden_fork_client::{AppError, AppState, ProfileService};
use hidden_fork_core::{
    AccountKind, CustomerPatch, RestaurantPatch, RestaurantStatus, RestaurantType, TagSet,
    Weekday,
};

use super::Credentials;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Print the signed-in account's profile
    Show {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Merge the supplied fields into the profile
    Edit {
        #[command(flatten)]
        credentials: Credentials,

        /// Display name (customer accounts)
        #[arg(long)]
        name: Option<String>,

        /// Contact info (customer accounts)
        #[arg(long)]
        contact: Option<String>,

        /// Bio (customer accounts)
        #[arg(long)]
        bio: Option<String>,

        /// Business name (restaurant accounts)
        #[arg(long)]
        business_name: Option<String>,

        /// Street address (restaurant accounts)
        #[arg(long)]
        address: Option<String>,

        /// "Restaurant" or "Food Truck" (restaurant accounts)
        #[arg(long)]
        kind: Option<RestaurantType>,

        /// Busyness: busy, moderate, or slow (restaurant accounts)
        #[arg(long)]
        status: Option<RestaurantStatus>,
    },
}

#[derive(Subcommand)]
pub enum HoursAction {
    /// Set one day's opening hours
    Set {
        #[command(flatten)]
        credentials: Credentials,

        /// Day of the week (mon..sun)
        #[arg(long)]
        day: Weekday,

        /// Opening hours text, e.g. "9 AM - 5 PM"
        #[arg(long, conflicts_with = "closed", required_unless_present = "closed")]
        open: Option<String>,

        /// Mark the day closed
        #[arg(long)]
        closed: bool,
    },
    /// Print the weekly hours
    Show {
        #[command(flatten)]
        credentials: Credentials,
    },
}

#[derive(Subcommand)]
pub enum TagsAction {
    /// Replace the tag selection (at most two tags)
    Set {
        #[command(flatten)]
        credentials: Credentials,

        /// Tags to select
        tags: Vec<String>,
    },
}

pub async fn run(state: &AppState, action: ProfileAction) -> Result<(), AppError> {
    let service = ProfileService::new(state.clone());
    match action {
        ProfileAction::Show { credentials } => {
            let (session, kind) = super::authenticate_as(state, &credentials, None).await?;
            match kind {
                AccountKind::Customer => {
                    let profile = service.load_customer(&session.account_id).await?;
                    tracing::info!("customer profile for {}", session.account_id);
                    tracing::info!("  name:    {}", profile.display_name);
                    tracing::info!("  contact: {}", profile.contact_info);
                    tracing::info!("  bio:     {}", profile.bio);
                    if let Some(url) = &profile.profile_image_url {
                        tracing::info!("  image:   {url}");
                    }
                }
                AccountKind::Restaurant => {
                    let view = service.load_restaurant_view(&session.account_id).await?;
                    let profile = &view.profile;
                    tracing::info!("restaurant profile for {}", session.account_id);
                    tracing::info!("  business: {}", profile.business_name);
                    if let Some(kind) = &profile.restaurant_type {
                        tracing::info!("  type:     {kind}");
                    }
                    tracing::info!("  address:  {}", profile.address);
                    if let Some(coordinates) = view.coordinates {
                        tracing::info!(
                            "  location: {}, {}",
                            coordinates.latitude,
                            coordinates.longitude
                        );
                    }
                    if let Some(status) = &profile.status {
                        tracing::info!("  status:   {status}");
                    }
                    tracing::info!("  tags:     {}", profile.tags.as_slice().join(", "));
                    for day in Weekday::ALL {
                        tracing::info!("  {}: {}", day.short_name(), profile.hours.get(day));
                    }
                    tracing::info!("  events:   {}", profile.events.len());
                }
            }
            Ok(())
        }
        ProfileAction::Edit {
            credentials,
            name,
            contact,
            bio,
            business_name,
            address,
            kind,
            status,
        } => {
            let (session, account_kind) =
                super::authenticate_as(state, &credentials, None).await?;
            match account_kind {
                AccountKind::Customer => {
                    let patch = CustomerPatch {
                        display_name: name,
                        contact_info: contact,
                        bio,
                        profile_image_url: None,
                    };
                    if patch.is_empty() {
                        tracing::info!("nothing to change");
                        return Ok(());
                    }
                    service.save_customer(&session.account_id, patch).await?;
                }
                AccountKind::Restaurant => {
                    let patch = RestaurantPatch {
                        business_name,
                        restaurant_type: kind,
                        address,
                        status,
                        ..RestaurantPatch::default()
                    };
                    if patch.is_empty() {
                        tracing::info!("nothing to change");
                        return Ok(());
                    }
                    service.save_restaurant(&session.account_id, patch).await?;
                }
            }
            tracing::info!("profile updated");
            Ok(())
        }
    }
}

pub async fn run_hours(state: &AppState, action: HoursAction) -> Result<(), AppError> {
    let service = ProfileService::new(state.clone());
    match action {
        HoursAction::Set {
            credentials,
            day,
            open,
            closed,
        } => {
            let (session, _) =
                super::authenticate_as(state, &credentials, Some(AccountKind::Restaurant)).await?;
            // The hours map is stored as one field, so the whole week is
            // read, changed, and written back.
            let mut hours = service.load_restaurant(&session.account_id).await?.hours;
            // clap guarantees --open when --closed is absent.
            let value = if closed {
                String::new()
            } else {
                open.unwrap_or_default()
            };
            hours.set(day, value);
            let patch = RestaurantPatch {
                hours: Some(hours),
                ..RestaurantPatch::default()
            };
            service.save_restaurant(&session.account_id, patch).await?;
            tracing::info!("hours updated for {}", day.short_name());
            Ok(())
        }
        HoursAction::Show { credentials } => {
            let (session, _) =
                super::authenticate_as(state, &credentials, Some(AccountKind::Restaurant)).await?;
            let profile = service.load_restaurant(&session.account_id).await?;
            for day in Weekday::ALL {
                tracing::info!("{}: {}", day.short_name(), profile.hours.get(day));
            }
            Ok(())
        }
    }
}

pub async fn run_tags(state: &AppState, action: TagsAction) -> Result<(), AppError> {
    let service = ProfileService::new(state.clone());
    match action {
        TagsAction::Set { credentials, tags } => {
            let (session, _) =
                super::authenticate_as(state, &credentials, Some(AccountKind::Restaurant)).await?;
            let mut selection = TagSet::new();
            for tag in tags {
                selection.try_add(tag)?;
            }
            let patch = RestaurantPatch {
                tags: Some(selection),
                ..RestaurantPatch::default()
            };
            service.save_restaurant(&session.account_id, patch).await?;
            tracing::info!("tags updated");
            Ok(())
        }
    }
}
