//! Subcommand implementations.
//!
//! Each command is one user action: authenticate if needed, call the
//! domain service, report through tracing. Session state never outlives
//! the process; authed commands sign in with the supplied credentials.

use clap::Args;

use hidden_fork_client::{AppError, AppState};
use hidden_fork_client::backend::Session;
use hidden_fork_core::{AccountKind, Email};

pub mod account;
pub mod events;
pub mod media;
pub mod profile;
pub mod search;

/// Credentials accepted by every authenticated command.
#[derive(Args)]
pub struct Credentials {
    /// Account email address
    #[arg(short, long)]
    pub email: String,

    /// Account password
    #[arg(short, long)]
    pub password: String,
}

/// Sign in with the supplied credentials.
pub async fn authenticate(
    state: &AppState,
    credentials: &Credentials,
) -> Result<Session, AppError> {
    let email = parse_email(&credentials.email)?;
    let session = state.auth().sign_in(&email, &credentials.password).await?;
    Ok(session)
}

/// Sign in and determine the account's type.
///
/// `expected` is what the command needs the account to be when it only
/// works for one kind; `None` accepts either. An account that has not
/// chosen a type yet, or has the wrong one, fails with a pointer at
/// `hf onboard`.
pub async fn authenticate_as(
    state: &AppState,
    credentials: &Credentials,
    expected: Option<AccountKind>,
) -> Result<(Session, AccountKind), AppError> {
    let session = authenticate(state, credentials).await?;
    let kind = hidden_fork_client::OnboardingService::new(state.clone())
        .account_kind(&session.account_id)
        .await?;
    match (kind, expected) {
        (Some(kind), None) => Ok((session, kind)),
        (Some(kind), Some(expected)) if kind == expected => Ok((session, kind)),
        (Some(kind), Some(expected)) => {
            tracing::error!("this command needs a {expected} account; yours is a {kind}");
            Err(AppError::AlreadyAssigned { existing: kind })
        }
        (None, expected) => {
            tracing::error!("account has not chosen a type yet; run `hf onboard` first");
            Err(AppError::ProfileNotFound {
                kind: expected.unwrap_or(AccountKind::Customer),
                account_id: session.account_id.to_string(),
            })
        }
    }
}

fn parse_email(raw: &str) -> Result<Email, AppError> {
    Email::parse(raw).map_err(|err| {
        tracing::error!("invalid email address: {err}");
        AppError::Auth(hidden_fork_client::backend::AuthError::InvalidCredentials)
    })
}
