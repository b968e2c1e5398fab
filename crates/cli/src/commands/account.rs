//! Account lifecycle commands: signup, login, onboard.

use hidden_fork_client::{AppError, AppState, OnboardingService};
use hidden_fork_core::AccountKind;

use super::Credentials;

/// Create a new account. The account has no type until `hf onboard` runs.
pub async fn signup(state: &AppState, credentials: &Credentials) -> Result<(), AppError> {
    let email = super::parse_email(&credentials.email)?;
    let session = state.auth().sign_up(&email, &credentials.password).await?;
    tracing::info!("account created: {}", session.account_id);
    tracing::info!("next: choose a type with `hf onboard --kind customer|restaurant`");
    Ok(())
}

/// Sign in and report the account's type.
pub async fn login(state: &AppState, credentials: &Credentials) -> Result<(), AppError> {
    let session = super::authenticate(state, credentials).await?;
    let kind = OnboardingService::new(state.clone())
        .account_kind(&session.account_id)
        .await?;
    match kind {
        Some(kind) => tracing::info!("signed in as {} ({kind})", session.account_id),
        None => {
            tracing::info!("signed in as {} (no type chosen yet)", session.account_id);
            tracing::info!("next: `hf onboard --kind customer|restaurant`");
        }
    }
    Ok(())
}

/// Assign the account its type, exactly once.
pub async fn onboard(
    state: &AppState,
    credentials: &Credentials,
    kind: AccountKind,
) -> Result<(), AppError> {
    let session = super::authenticate(state, credentials).await?;
    OnboardingService::new(state.clone())
        .assign(&session, kind)
        .await?;
    tracing::info!("account {} onboarded as {kind}", session.account_id);
    Ok(())
}
