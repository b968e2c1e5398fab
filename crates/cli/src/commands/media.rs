//! Profile image commands.

use std::path::PathBuf;

use async_trait::async_trait;
use clap::Subcommand;

use hidden_fork_client::backend::StoreError;
use hidden_fork_client::{
    AppError, AppState, ImageSource, MediaService, UploadOutcome,
};
use hidden_fork_client::media::{NormalizedImage, PickedImage};

use super::Credentials;

#[derive(Subcommand)]
pub enum ImageAction {
    /// Upload an image file as the profile image
    Set {
        #[command(flatten)]
        credentials: Credentials,

        /// Path to the image file (JPEG, pre-sized)
        #[arg(long)]
        file: PathBuf,
    },
}

/// Image source reading from a local file.
///
/// The terminal has no picker and no codec, so "picking" is reading the
/// file and normalization trusts the input to be sized already. The
/// mobile clients own the real downscale path.
struct FileImageSource {
    path: PathBuf,
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn pick(&self) -> Result<Option<PickedImage>, AppError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|err| {
            tracing::error!("cannot read {}: {err}", self.path.display());
            AppError::Store(StoreError::NotFound(self.path.display().to_string()))
        })?;
        Ok(Some(PickedImage {
            bytes,
            content_type: content_type_for(&self.path),
        }))
    }

    async fn normalize(&self, image: PickedImage) -> Result<NormalizedImage, AppError> {
        Ok(NormalizedImage {
            bytes: image.bytes,
            content_type: image.content_type,
        })
    }
}

fn content_type_for(path: &std::path::Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png".to_string(),
        _ => "image/jpeg".to_string(),
    }
}

pub async fn run(state: &AppState, action: ImageAction) -> Result<(), AppError> {
    match action {
        ImageAction::Set { credentials, file } => {
            let (session, kind) = super::authenticate_as(state, &credentials, None).await?;
            let source = FileImageSource { path: file };
            let outcome = MediaService::new(state.clone())
                .set_profile_image(kind, &session.account_id, &source)
                .await?;
            match outcome {
                UploadOutcome::Updated { url } => tracing::info!("profile image set: {url}"),
                UploadOutcome::Cancelled => tracing::info!("cancelled"),
            }
            Ok(())
        }
    }
}
