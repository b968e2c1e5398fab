//! Restaurant discovery.

use hidden_fork_client::{AppError, AppState, SearchService};

pub async fn run(state: &AppState) -> Result<(), AppError> {
    let summaries = SearchService::new(state.clone()).map_restaurants().await?;
    if summaries.is_empty() {
        tracing::info!("no restaurants yet");
        return Ok(());
    }
    for summary in summaries {
        let profile = &summary.profile;
        let name = if profile.business_name.is_empty() {
            "(unnamed)"
        } else {
            &profile.business_name
        };
        match summary.coordinates {
            Some(coordinates) => tracing::info!(
                "{name} - {} ({}, {})",
                profile.address,
                coordinates.latitude,
                coordinates.longitude
            ),
            None => tracing::info!("{name} - {}", profile.address),
        }
    }
    Ok(())
}
